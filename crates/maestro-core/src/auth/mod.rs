//! Authentication module for managing the user's Spotify-backed session.
//!
//! This module provides:
//! - `SessionData`: The persisted credential record with expiry helpers
//! - `SessionStorage`: Durable local storage under one well-known key
//! - `SessionStore`: Login, refresh and logout lifecycle with state subscription

pub mod session;
pub mod storage;
pub mod store;

pub use session::{parse_expiry, SessionData, DEFAULT_TOKEN_LIFETIME_SECS};
pub use storage::{SessionStorage, SESSION_KEY};
pub use store::{callback_code, AuthState, SessionStore, StartupExpiryPolicy};
