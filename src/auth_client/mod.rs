//! Auth client — token lifecycle on top of a pluggable user API.
//!
//! ARCHITECTURE
//! ============
//! [`AuthClient`] owns no globals: callers construct it from an [`AuthApi`]
//! transport and a [`CredentialStore`]. Two transports exist: the in-process
//! [`crate::mock_api::MockApi`] and [`http::HttpAuthApi`], which speaks the
//! `/api/users/*` HTTP contract to a running server.
//!
//! TRADE-OFFS
//! ==========
//! `get_valid_token` is the only self-healing path. It refreshes once and, on
//! any failure, clears credentials and reports "no token" instead of an error.
//! There are no retries. Logout is local only; the API has no invalidation call.

pub mod http;

use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::models::{LoginRequest, LoginResponse, RefreshResponse, User, UserUpdate};
use crate::storage::StorageError;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("credential storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("transport failed: {0}")]
    Transport(String),
}

// =============================================================================
// TRANSPORT TRAIT
// =============================================================================

/// The user API as seen by the client. Enables in-process and HTTP backends.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] when the pair does not match a user.
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AuthError>;

    /// # Errors
    ///
    /// Transport failures only; the mock backend never rejects a refresh.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError>;

    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] when the bearer token is not recognized.
    async fn current_user(&self, access_token: &str) -> Result<User, AuthError>;

    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] when the bearer token is not recognized.
    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User, AuthError>;
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct AuthClient {
    api: Arc<dyn AuthApi>,
    credentials: CredentialStore,
}

impl AuthClient {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, credentials: CredentialStore) -> Self {
        Self { api, credentials }
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Log in, persist the token pair and cache the returned profile.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] on mismatch; storage or transport failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let req = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let resp = self.api.login(&req).await?;

        self.credentials.set(&resp.access_token, &resp.refresh_token)?;
        self.credentials.cache_user(&resp.user)?;
        tracing::info!(user_id = %resp.user.id, "logged in");
        Ok(resp.user)
    }

    /// Exchange the stored refresh token for a new pair and persist it.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingRefreshToken`] when nothing is stored; transport or
    /// storage failures otherwise.
    pub async fn refresh(&self) -> Result<RefreshResponse, AuthError> {
        let refresh_token = self.credentials.refresh_token().ok_or(AuthError::MissingRefreshToken)?;
        let resp = self.api.refresh(&refresh_token).await?;
        self.credentials.set(&resp.access_token, &resp.refresh_token)?;
        tracing::debug!("access token refreshed");
        Ok(resp)
    }

    /// Current access token, silently refreshed when expired.
    ///
    /// Returns `None` when there is no token, or when a refresh was needed and
    /// failed. In the latter case every stored credential is cleared first.
    pub async fn get_valid_token(&self) -> Option<String> {
        let access = self.credentials.access_token()?;
        if !self.credentials.is_expired() {
            return Some(access);
        }

        match self.refresh().await {
            Ok(resp) => Some(resp.access_token),
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, clearing credentials");
                if let Err(clear_err) = self.credentials.clear() {
                    tracing::error!(error = %clear_err, "failed to clear credentials");
                }
                None
            }
        }
    }

    /// Access token present and not past its self-assigned expiry.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.access_token().is_some() && !self.credentials.is_expired()
    }

    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] when the API does not recognize `token`.
    pub async fn get_current_user(&self, token: &str) -> Result<User, AuthError> {
        let user = self.api.current_user(token).await?;
        self.credentials.cache_user(&user)?;
        Ok(user)
    }

    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] when the API does not recognize `token`.
    pub async fn update_user(&self, token: &str, update: &UserUpdate) -> Result<User, AuthError> {
        let user = self.api.update_user(token, update).await?;
        self.credentials.cache_user(&user)?;
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    /// Drop all local credential state. Nothing is sent to the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store fails to write.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.credentials.clear()?;
        tracing::info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
