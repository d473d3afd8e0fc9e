//! Core library for maestro: a client for the maestro backend, which turns a
//! user's Spotify listening history into music personality analyses and
//! AI-generated playlists.
//!
//! - [`auth`]: Session lifecycle (login, refresh, logout) and durable storage
//! - [`api`]: Authenticated HTTP client with one-shot token refresh
//! - [`models`]: Backend response payloads
//! - [`config`]: Backend URL and client settings

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, SessionData, SessionStore};
pub use config::Config;
