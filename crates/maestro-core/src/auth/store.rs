//! Session store: the single source of truth for "is the user logged in".
//!
//! The store owns the in-memory [`SessionData`] and is the only writer of the
//! persisted copy. Consumers read through its accessors and observe lifecycle
//! changes through [`SessionStore::subscribe`].

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{SessionData, SessionStorage};
use crate::api::{ApiError, AuthApi};

/// Where the store sits in the login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// Authorization code exchange in flight
    Authenticating,
    Authenticated,
    /// Access token refresh in flight
    Refreshing,
}

impl AuthState {
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Unauthenticated => "logged out",
            AuthState::Authenticating => "logging in",
            AuthState::Authenticated => "logged in",
            AuthState::Refreshing => "refreshing",
        }
    }
}

/// What to do with a persisted session whose access token has already expired
/// when the store starts up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupExpiryPolicy {
    /// Destroy it; the user logs in again.
    #[default]
    Discard,
    /// Keep it; the first 401 from the backend triggers a refresh.
    DeferToServer,
}

pub struct SessionStore {
    auth: AuthApi,
    storage: SessionStorage,
    policy: StartupExpiryPolicy,
    session: RwLock<Option<SessionData>>,
    /// Serializes refreshes so overlapping 401s share one round-trip
    refresh_lock: Mutex<()>,
    state_tx: watch::Sender<AuthState>,
}

impl SessionStore {
    pub fn new(auth: AuthApi, storage: SessionStorage, policy: StartupExpiryPolicy) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            auth,
            storage,
            policy,
            session: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            state_tx,
        }
    }

    /// Restore the persisted session, if there is a usable one
    pub async fn initialize(&self) -> AuthState {
        let loaded = match self.storage.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session");
                self.clear_storage();
                None
            }
        };

        let restored = match loaded {
            None => {
                debug!("No persisted session");
                None
            }
            Some(data) if data.is_expired() && self.policy == StartupExpiryPolicy::Discard => {
                info!(user_id = data.user_id, "Persisted session expired, discarding");
                self.clear_storage();
                None
            }
            Some(data) => {
                debug!(
                    user_id = data.user_id,
                    expired = data.is_expired(),
                    "Restored persisted session"
                );
                Some(data)
            }
        };

        let state = if restored.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        *self.session.write().await = restored;
        self.set_state(state);
        state
    }

    /// Ask the backend where to send the user to grant access.
    /// Local state is untouched; the session is created by [`Self::complete_login`].
    pub async fn login(&self) -> Result<String, ApiError> {
        let url = self.auth.authorization_url().await?;
        info!("Obtained Spotify authorization URL");
        Ok(url)
    }

    /// Exchange the one-time code from the OAuth redirect for a session
    pub async fn complete_login(&self, code: &str) -> Result<SessionData, ApiError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::AuthExchange(
                "Authorization code not found".to_string(),
            ));
        }

        let previous = self.state();
        self.set_state(AuthState::Authenticating);

        let result = self.exchange_and_persist(code).await;
        match &result {
            Ok(data) => {
                info!(user_id = data.user_id, "Login complete");
                self.set_state(AuthState::Authenticated);
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.set_state(previous);
            }
        }
        result
    }

    async fn exchange_and_persist(&self, code: &str) -> Result<SessionData, ApiError> {
        let data = self.auth.exchange_code(code).await?;
        self.storage
            .save(&data)
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;
        *self.session.write().await = Some(data.clone());
        Ok(data)
    }

    /// Same as [`Self::complete_login`], starting from the full redirect URL
    pub async fn complete_login_from_redirect(&self, redirect: &str) -> Result<SessionData, ApiError> {
        let code = callback_code(redirect)?;
        self.complete_login(&code).await
    }

    /// Trade the refresh token for a new access token, returning it.
    ///
    /// Any failure destroys the session: afterwards the user has to log in again.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refresh on behalf of a request that was rejected while carrying
    /// `stale_token`. If another caller already replaced that token while we
    /// waited for the lock, its result is reused instead of refreshing again.
    pub async fn refresh_after(&self, stale_token: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.access_token().await {
            if Some(current.as_str()) != stale_token {
                debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<String, ApiError> {
        let refresh_token = {
            let session = self.session.read().await;
            match session.as_ref() {
                None => None,
                Some(data) => Some(data.refresh_token.clone()),
            }
        };

        let refresh_token = match refresh_token {
            None => return Err(self.fail_refresh("no active session").await),
            Some(None) => return Err(self.fail_refresh("no refresh token present").await),
            Some(Some(token)) => token,
        };

        self.set_state(AuthState::Refreshing);
        let refreshed = match self.auth.refresh_access_token(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => return Err(self.fail_refresh(&e.to_string()).await),
        };

        let updated = {
            let mut session = self.session.write().await;
            session.as_mut().map(|data| {
                data.apply_refresh(
                    refreshed.access_token.clone(),
                    refreshed.expires_in,
                    refreshed.refresh_token,
                );
                data.clone()
            })
        };
        // Logged out while the refresh was in flight
        let Some(updated) = updated else {
            return Err(self.fail_refresh("logged out during refresh").await);
        };

        self.set_state(AuthState::Authenticated);
        // The in-memory session stays usable; only the persisted copy is stale
        if let Err(e) = self.storage.save(&updated) {
            warn!(error = %e, "Failed to persist refreshed session");
            return Err(ApiError::Storage(format!("{:#}", e)));
        }
        info!(user_id = updated.user_id, "Access token refreshed");
        Ok(refreshed.access_token)
    }

    async fn fail_refresh(&self, reason: &str) -> ApiError {
        warn!(reason = reason, "Token refresh failed, ending session");
        self.destroy().await;
        ApiError::RefreshFailed(reason.to_string())
    }

    /// End the session. Never fails; storage problems are only logged.
    pub async fn logout(&self) {
        self.destroy().await;
        info!("Logged out");
    }

    async fn destroy(&self) {
        *self.session.write().await = None;
        self.clear_storage();
        self.set_state(AuthState::Unauthenticated);
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to remove persisted session");
        }
    }

    fn set_state(&self, state: AuthState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            debug!(state = state.label(), "Auth state changed");
        }
    }

    // ===== Accessors =====

    pub fn state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    /// Observe lifecycle transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub async fn session(&self) -> Option<SessionData> {
        self.session.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|d| d.access_token.clone())
    }

    pub async fn user_id(&self) -> Option<i64> {
        self.session.read().await.as_ref().map(|d| d.user_id)
    }

    pub async fn require_user_id(&self) -> Result<i64, ApiError> {
        self.user_id().await.ok_or(ApiError::NotAuthenticated)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }
}

/// Pull the authorization code out of an OAuth redirect.
///
/// Accepts either the full redirect URL or a bare code. A provider-reported
/// `error` (e.g. the user pressed "Cancel") becomes [`ApiError::AuthExchange`].
pub fn callback_code(redirect: &str) -> Result<String, ApiError> {
    let redirect = redirect.trim();
    if !redirect.contains("://") && !redirect.contains('?') {
        return Ok(redirect.to_string());
    }

    let query = redirect.split_once('?').map(|(_, q)| q).unwrap_or("");
    let url = reqwest::Url::parse(&format!("http://callback.invalid/?{}", query))
        .map_err(|e| ApiError::AuthExchange(format!("invalid redirect URL: {}", e)))?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return Err(ApiError::AuthExchange(value.into_owned())),
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            _ => {}
        }
    }
    code.ok_or_else(|| ApiError::AuthExchange("Authorization code not found".to_string()))
}
