//! API client for the maestro backend.
//!
//! Every request carries the current session's bearer token. A `401` triggers
//! one silent refresh through the [`SessionStore`], after which the request is
//! reissued exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{ApiError, AuthApi};
use crate::auth::{SessionStorage, SessionStore, StartupExpiryPolicy};
use crate::models::{Analysis, Dashboard, GeneratedPlaylist, PlaylistRequest, UserProfile};

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// An outbound request to the backend, relative to the base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Which send of a request this is. Only an `Initial` attempt may trigger a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Retried,
}

impl Attempt {
    pub fn may_reauthenticate(self) -> bool {
        self == Attempt::Initial
    }
}

/// Build the `reqwest::Client` shared by [`ApiClient`] and [`AuthApi`]
pub fn http_client(timeout_secs: u64) -> Result<Client, ApiError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// API client for the maestro backend.
/// Clone is cheap - the reqwest client and session store are both shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(client: Client, base_url: impl Into<String>, store: Arc<SessionStore>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Wire up a session store and API client against one backend
    pub fn connect(
        base_url: &str,
        timeout_secs: u64,
        storage: SessionStorage,
        policy: StartupExpiryPolicy,
    ) -> Result<Self, ApiError> {
        let client = http_client(timeout_secs)?;
        let auth = AuthApi::new(client.clone(), base_url);
        let store = Arc::new(SessionStore::new(auth, storage, policy));
        Ok(Self::new(client, base_url, store))
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request, refreshing the session once if the backend rejects the token
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let mut token = self.store.access_token().await;
        let mut attempt = Attempt::Initial;

        loop {
            let response = self.dispatch(request, token.as_deref(), attempt).await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt.may_reauthenticate() {
                warn!(path = %request.path, "Request unauthorized, refreshing session");
                // The reissue waits on the refresh; it never races it
                token = Some(self.store.refresh_after(token.as_deref()).await?);
                attempt = Attempt::Retried;
                continue;
            }

            return Self::decode(request, response).await;
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        attempt: Attempt,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, url = %url, ?attempt, authenticated = token.is_some(), "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    /// Decode a 2xx body, or map the status to an error with the body attached
    async fn decode<T: DeserializeOwned>(
        request: &ApiRequest,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(path = %request.path, status = %status, "Request failed");
            return Err(ApiError::from_status(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", request.path, e))
        })
    }

    // ===== Endpoints =====

    /// Fetch the user's Spotify profile
    pub async fn get_user_profile(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        self.send(&ApiRequest::get(format!("/users/{}/profile/", user_id)))
            .await
    }

    /// Generate a new music personality analysis
    pub async fn analyze_user(&self, user_id: i64) -> Result<Analysis, ApiError> {
        self.send(&ApiRequest::post("/analyze/", json!({ "user_id": user_id })))
            .await
    }

    /// List the user's previous analyses, newest first
    pub async fn get_user_analyses(&self, user_id: i64) -> Result<Vec<Analysis>, ApiError> {
        self.send(&ApiRequest::get(format!("/users/{}/analyses/", user_id)))
            .await
    }

    /// Generate a playlist from a mood and/or prompt and save it to Spotify
    pub async fn generate_playlist(
        &self,
        user_id: i64,
        request: &PlaylistRequest,
    ) -> Result<GeneratedPlaylist, ApiError> {
        let body = serde_json::to_value(request.body(user_id)?)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.send(&ApiRequest::post("/generate-playlist/", body)).await
    }

    /// List the playlists generated for the user
    pub async fn get_user_playlists(&self, user_id: i64) -> Result<Vec<GeneratedPlaylist>, ApiError> {
        self.send(&ApiRequest::get(format!("/users/{}/playlists/", user_id)))
            .await
    }

    /// Fetch analyses and playlists concurrently for the dashboard
    pub async fn fetch_dashboard(&self, user_id: i64) -> Result<Dashboard, ApiError> {
        let (analyses, playlists) = futures::try_join!(
            self.get_user_analyses(user_id),
            self.get_user_playlists(user_id)
        )?;
        Ok(Dashboard {
            analyses,
            playlists,
        })
    }
}
