//! Client-side credential store.
//!
//! DESIGN
//! ======
//! Tokens live in a [`KeyValueStore`] under fixed string keys. The expiry is
//! not issued by the server: it is self-assigned as `now + ttl` whenever a
//! token pair is written. The access token, refresh token and expiry are
//! written and cleared together; any missing key reads as "absent".

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::models::User;
use crate::storage::{KeyValueStore, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const TOKEN_EXPIRY_KEY: &str = "tokenExpiry";
pub const CURRENT_USER_KEY: &str = "currentUser";

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// A complete credential triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix milliseconds.
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CredentialStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn ttl_ms(&self) -> i64 {
        self.ttl.as_millis() as i64
    }

    /// Persist a token pair and stamp `expires_at = now + ttl`.
    ///
    /// A failed write leaves no credentials behind rather than a mixed pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails to write.
    pub fn set(&self, access: &str, refresh: &str) -> Result<(), StorageError> {
        let expires_at = self.clock.now_ms() + self.ttl_ms();
        let written = self
            .store
            .set(ACCESS_TOKEN_KEY, access)
            .and_then(|()| self.store.set(REFRESH_TOKEN_KEY, refresh))
            .and_then(|()| self.store.set(TOKEN_EXPIRY_KEY, &expires_at.to_string()));

        if let Err(e) = written {
            tracing::warn!(error = %e, "credential write failed, clearing");
            if let Err(clear_err) = self.clear() {
                tracing::error!(error = %clear_err, "failed to clear partial credentials");
            }
            return Err(e);
        }
        tracing::debug!(expires_at, "credentials stored");
        Ok(())
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Stored expiry in Unix milliseconds. An unparseable value reads as absent.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.store.get(TOKEN_EXPIRY_KEY).and_then(|raw| raw.trim().parse().ok())
    }

    /// The full triple, only when every field is present.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
            expires_at: self.expires_at()?,
        })
    }

    /// True when no expiry is stored or the clock has passed it.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_none_or(|expires_at| self.clock.now_ms() > expires_at)
    }

    /// Last profile snapshot seen by the client, if any.
    #[must_use]
    pub fn cached_user(&self) -> Option<User> {
        self.store
            .get(CURRENT_USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// # Errors
    ///
    /// Returns an error if the backing store fails to write.
    pub fn cache_user(&self, user: &User) -> Result<(), StorageError> {
        // User always serializes; an empty object would read back as absent.
        let raw = serde_json::to_string(user).unwrap_or_default();
        self.store.set(CURRENT_USER_KEY, &raw)
    }

    /// Remove every credential field and the cached profile. Every key is
    /// attempted even after a failure.
    ///
    /// # Errors
    ///
    /// Returns the first write failure from the backing store.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRY_KEY, CURRENT_USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }
        tracing::debug!("credentials cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
