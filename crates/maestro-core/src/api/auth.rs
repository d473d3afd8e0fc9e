//! Bindings for the backend's Spotify OAuth endpoints.
//!
//! These calls are made before a session exists (or to replace its access
//! token), so they never carry a bearer credential.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ApiError;
use crate::auth::session::{expiry_from_now, parse_expiry};
use crate::auth::SessionData;

#[derive(Debug, Deserialize)]
struct AuthUrlResponse {
    auth_url: Option<String>,
    error: Option<String>,
}

/// Payload of `GET /auth/spotify/callback/`. Every field is optional on the
/// wire; [`CallbackResponse::into_session`] decides what is acceptable.
#[derive(Debug, Default, Deserialize)]
struct CallbackResponse {
    user_id: Option<i64>,
    spotify_id: Option<String>,
    access_token: Option<String>,
    token_expires: Option<String>,
    refresh_token: Option<String>,
    error: Option<String>,
}

impl CallbackResponse {
    fn into_session(self) -> Result<SessionData, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::AuthExchange(error));
        }
        let missing = |field: &str| ApiError::AuthExchange(format!("callback response missing {}", field));

        let user_id = self.user_id.ok_or_else(|| missing("user_id"))?;
        let spotify_id = self
            .spotify_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("spotify_id"))?;
        let access_token = self
            .access_token
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("access_token"))?;

        let token_expires: DateTime<Utc> = match self.token_expires.as_deref() {
            Some(raw) => parse_expiry(raw).ok_or_else(|| {
                ApiError::AuthExchange(format!("unrecognized token_expires: {}", raw))
            })?,
            None => expiry_from_now(None),
        };

        Ok(SessionData {
            user_id,
            spotify_id,
            access_token,
            token_expires,
            refresh_token: self.refresh_token.filter(|s| !s.is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Result of a successful token refresh
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Unauthenticated client for the OAuth endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthApi {
    client: Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /auth/spotify/` - where to send the user to grant access
    pub async fn authorization_url(&self) -> Result<String, ApiError> {
        let url = format!("{}/auth/spotify/", self.base_url);
        debug!(url = %url, "Requesting Spotify authorization URL");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let parsed: AuthUrlResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("auth url response: {}", e)))?;
        match (parsed.auth_url, parsed.error) {
            (Some(auth_url), _) if !auth_url.is_empty() => Ok(auth_url),
            (_, Some(error)) => Err(ApiError::InvalidResponse(error)),
            _ => Err(ApiError::InvalidResponse(
                "Failed to get Spotify auth URL".to_string(),
            )),
        }
    }

    /// `GET /auth/spotify/callback/?code=` - trade a one-time code for a session
    pub async fn exchange_code(&self, code: &str) -> Result<SessionData, ApiError> {
        let url = format!("{}/auth/spotify/callback/", self.base_url);
        debug!(url = %url, "Exchanging authorization code");

        let response = self
            .client
            .get(&url)
            .query(&[("code", code)])
            .send()
            .await
            .map_err(|e| ApiError::AuthExchange(format!("callback request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::AuthExchange(format!("failed to read callback response: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::AuthExchange(ApiError::error_message(&body)));
        }

        let parsed: CallbackResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::AuthExchange(format!("malformed callback response: {}", e)))?;
        parsed.into_session()
    }

    /// `POST /auth/spotify/refresh-token/` - mint a new access token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<RefreshedToken, ApiError> {
        let url = format!("{}/auth/spotify/refresh-token/", self.base_url);
        debug!(url = %url, "Refreshing access token");

        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let refreshed: RefreshedToken = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("refresh response: {}", e)))?;
        if refreshed.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "refresh response carried an empty access token".to_string(),
            ));
        }
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(json: &str) -> CallbackResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_callback_into_session() {
        let session = parse(
            r#"{"user_id": 7, "spotify_id": "abc", "access_token": "T1",
                "token_expires": "2030-06-01T00:00:00Z", "refresh_token": "R1"}"#,
        )
        .into_session()
        .unwrap();

        assert_eq!(session.user_id, 7);
        assert_eq!(session.spotify_id, "abc");
        assert_eq!(session.access_token, "T1");
        assert_eq!(session.refresh_token.as_deref(), Some("R1"));
        assert_eq!(
            session.token_expires,
            Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_callback_defaults_expiry_to_one_hour() {
        let session = parse(r#"{"user_id": 1, "spotify_id": "s", "access_token": "a"}"#)
            .into_session()
            .unwrap();
        assert!(session.refresh_token.is_none());
        let minutes = session.minutes_until_expiry();
        assert!((59..=60).contains(&minutes));
    }

    #[test]
    fn test_callback_error_field() {
        let err = parse(r#"{"error": "invalid_grant"}"#).into_session().unwrap_err();
        assert!(matches!(err, ApiError::AuthExchange(ref m) if m == "invalid_grant"));
    }

    #[test]
    fn test_callback_rejects_partial_payload() {
        let err = parse(r#"{"user_id": 1, "spotify_id": "s"}"#)
            .into_session()
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthExchange(ref m) if m.contains("access_token")));

        let err = parse(r#"{"spotify_id": "s", "access_token": "a"}"#)
            .into_session()
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthExchange(ref m) if m.contains("user_id")));
    }

    #[test]
    fn test_callback_rejects_garbage_expiry() {
        let err = parse(
            r#"{"user_id": 1, "spotify_id": "s", "access_token": "a", "token_expires": "soon"}"#,
        )
        .into_session()
        .unwrap_err();
        assert!(matches!(err, ApiError::AuthExchange(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = AuthApi::new(Client::new(), "http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
    }
}
