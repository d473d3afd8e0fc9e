//! REST API client module for the maestro backend.
//!
//! This module provides the `ApiClient` for fetching profiles, analyses and
//! playlists, and `AuthApi` for the Spotify OAuth endpoints.
//!
//! The backend uses bearer token authentication. Tokens are obtained through
//! the Spotify authorization code flow and refreshed transparently on `401`.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{AuthApi, RefreshedToken};
pub use client::{http_client, ApiClient, ApiRequest, Attempt, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
