use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime assumed for an access token when the backend doesn't report one.
/// Spotify access tokens are valid for one hour.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// The authenticated user's credentials, as persisted in durable storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(rename = "id")]
    pub user_id: i64,
    pub spotify_id: String,
    pub access_token: String,
    pub token_expires: DateTime<Utc>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.token_expires
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.token_expires - Utc::now()
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }

    /// Swap in a refreshed access token. The refresh token is only replaced
    /// when the backend rotated it.
    pub(crate) fn apply_refresh(
        &mut self,
        access_token: String,
        expires_in: Option<i64>,
        rotated_refresh_token: Option<String>,
    ) {
        self.access_token = access_token;
        self.token_expires = expiry_from_now(expires_in);
        if let Some(token) = rotated_refresh_token {
            self.refresh_token = Some(token);
        }
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("user_id", &self.user_id)
            .field("spotify_id", &self.spotify_id)
            .field("access_token", &"<redacted>")
            .field("token_expires", &self.token_expires)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Absolute expiry for a token issued now.
pub(crate) fn expiry_from_now(expires_in: Option<i64>) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
}

/// Parse a token expiry as sent by the backend.
///
/// Accepts RFC 3339 (`2025-01-01T12:00:00Z`) as well as the naive ISO-8601
/// timestamps Django emits for timezone-less datetimes, which are read as UTC.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
