//! Mock backend — simulated user service with a mutable user table.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stands in for the real user API. The HTTP routes in `routes::users` expose
//! it over the wire, and it also implements [`AuthApi`] directly so the auth
//! client can talk to it in-process without a server.
//!
//! DESIGN
//! ======
//! The table and the "current session user" sit behind `tokio::sync::RwLock`
//! and are written through to a [`KeyValueStore`] on every change, so a
//! file-backed store lets a later process see the same edits. Every call
//! sleeps for a configurable delay before answering.
//!
//! TRADE-OFFS
//! ==========
//! Tokens are fixed strings, not per-session secrets: the profile endpoints
//! answer for whoever logged in last, whichever recognized token is presented.

pub mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::auth_client::{AuthApi, AuthError};
use crate::models::{LoginRequest, LoginResponse, MockUser, RefreshResponse, User, UserUpdate};
use crate::storage::{KeyValueStore, MemoryStore, StorageError};

pub const USERS_DB_KEY: &str = "mockUsersDatabase";
pub const CURRENT_USER_ID_KEY: &str = "mockCurrentUserId";

pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_PROFILE_DELAY: Duration = Duration::from_millis(300);

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("mock storage failed: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// LATENCY
// =============================================================================

/// Simulated round-trip delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    pub login: Duration,
    /// Applies to refresh and both profile endpoints.
    pub profile: Duration,
}

impl MockLatency {
    pub const NONE: Self = Self { login: Duration::ZERO, profile: Duration::ZERO };
}

impl Default for MockLatency {
    fn default() -> Self {
        Self { login: DEFAULT_LOGIN_DELAY, profile: DEFAULT_PROFILE_DELAY }
    }
}

async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// =============================================================================
// MOCK API
// =============================================================================

pub struct MockApi {
    users: RwLock<Vec<MockUser>>,
    current_user_id: RwLock<Option<String>>,
    latency: MockLatency,
    store: Arc<dyn KeyValueStore>,
}

impl MockApi {
    /// Table loaded from (and written back to) `store`. A missing or unreadable
    /// table falls back to the fixtures.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, latency: MockLatency) -> Self {
        let users = match store.get(USERS_DB_KEY).map(|raw| serde_json::from_str::<Vec<MockUser>>(&raw)) {
            Some(Ok(users)) => users,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "stored mock users unreadable, using fixtures");
                fixtures::initial_users()
            }
            None => fixtures::initial_users(),
        };
        let current = store
            .get(CURRENT_USER_ID_KEY)
            .unwrap_or_else(|| fixtures::DEFAULT_CURRENT_USER_ID.to_owned());

        Self { users: RwLock::new(users), current_user_id: RwLock::new(Some(current)), latency, store }
    }

    /// Fresh fixture table that lives only as long as the process.
    #[must_use]
    pub fn in_memory(latency: MockLatency) -> Self {
        Self::new(Arc::new(MemoryStore::new()), latency)
    }

    fn persist_users(&self, users: &[MockUser]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(users).unwrap_or_else(|_| "[]".into());
        self.store.set(USERS_DB_KEY, &raw)
    }

    fn persist_current(&self, id: &str) -> Result<(), StorageError> {
        self.store.set(CURRENT_USER_ID_KEY, id)
    }

    /// `POST /users/login`: match email and password against the table.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidCredentials`] when no row matches.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        simulate(self.latency.login).await;

        let user = {
            let users = self.users.read().await;
            users
                .iter()
                .find(|u| u.email == req.email && u.password == req.password)
                .map(MockUser::to_user)
        };
        let Some(user) = user else {
            tracing::info!(email = %req.email, "mock login rejected");
            return Err(ApiError::InvalidCredentials);
        };

        self.persist_current(&user.id)?;
        *self.current_user_id.write().await = Some(user.id.clone());
        tracing::info!(user_id = %user.id, "mock login accepted");

        Ok(LoginResponse {
            access_token: fixtures::LOGIN_ACCESS_TOKEN.to_owned(),
            refresh_token: fixtures::LOGIN_REFRESH_TOKEN.to_owned(),
            user,
        })
    }

    /// `POST /users/refresh`: always hands out the refreshed pair.
    pub async fn refresh(&self) -> RefreshResponse {
        simulate(self.latency.profile).await;
        tracing::debug!("mock token refresh");
        RefreshResponse {
            access_token: fixtures::REFRESHED_ACCESS_TOKEN.to_owned(),
            refresh_token: fixtures::REFRESHED_REFRESH_TOKEN.to_owned(),
        }
    }

    /// `GET /users/me`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] for an unrecognized token or when no session user exists.
    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        simulate(self.latency.profile).await;

        if !fixtures::is_recognized_token(token) {
            return Err(ApiError::Unauthorized);
        }
        let current = self.current_user_id.read().await.clone().ok_or(ApiError::Unauthorized)?;
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| u.id == current)
            .map(MockUser::to_user)
            .ok_or(ApiError::Unauthorized)
    }

    /// `PUT /users/me`: merge `update` into the session user's row.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] under the same rule as [`MockApi::current_user`].
    pub async fn update_user(&self, token: &str, update: &UserUpdate) -> Result<User, ApiError> {
        simulate(self.latency.profile).await;

        if !fixtures::is_recognized_token(token) {
            return Err(ApiError::Unauthorized);
        }
        let current = self.current_user_id.read().await.clone().ok_or(ApiError::Unauthorized)?;

        let mut users = self.users.write().await;
        let idx = users.iter().position(|u| u.id == current).ok_or(ApiError::Unauthorized)?;

        // The table only changes once the store has accepted the new version.
        let mut staged = users.clone();
        staged[idx].apply(update);
        self.persist_users(&staged)?;
        let updated = staged[idx].to_user();
        *users = staged;

        tracing::info!(user_id = %updated.id, "mock user updated");
        Ok(updated)
    }

    /// Restore the fixture table and the default session user.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence store fails to write.
    pub async fn reset(&self) -> Result<(), ApiError> {
        let mut users = self.users.write().await;
        *users = fixtures::initial_users();
        *self.current_user_id.write().await = Some(fixtures::DEFAULT_CURRENT_USER_ID.to_owned());

        self.store.remove(USERS_DB_KEY)?;
        self.store.remove(CURRENT_USER_ID_KEY)?;
        tracing::info!("mock data reset");
        Ok(())
    }
}

// =============================================================================
// IN-PROCESS TRANSPORT
// =============================================================================

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidCredentials => Self::InvalidCredentials,
            ApiError::Unauthorized => Self::InvalidToken,
            ApiError::Storage(e) => Self::Storage(e),
        }
    }
}

#[async_trait::async_trait]
impl AuthApi for MockApi {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AuthError> {
        Ok(MockApi::login(self, req).await?)
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        Ok(MockApi::refresh(self).await)
    }

    async fn current_user(&self, access_token: &str) -> Result<User, AuthError> {
        Ok(MockApi::current_user(self, access_token).await?)
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User, AuthError> {
        Ok(MockApi::update_user(self, access_token, update).await?)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
