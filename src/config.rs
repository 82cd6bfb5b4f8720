//! Portal configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::DEFAULT_TOKEN_TTL;
use crate::mock_api::{DEFAULT_LOGIN_DELAY, DEFAULT_PROFILE_DELAY, MockLatency};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORAGE_PATH: &str = ".pensionados/storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub port: u16,
    /// Credential file used by the client commands.
    pub storage_path: PathBuf,
    /// Mock user table file for the server. `None` keeps it in memory.
    pub mock_db_path: Option<PathBuf>,
    pub latency: MockLatency,
    pub token_ttl: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            mock_db_path: None,
            latency: MockLatency::default(),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

impl PortalConfig {
    /// Build config from environment variables. Every variable is optional;
    /// unparseable numbers fall back to their defaults.
    ///
    /// - `PORT`: default 3000
    /// - `PENSIONADOS_STORAGE_PATH`: default `.pensionados/storage.json`
    /// - `PENSIONADOS_MOCK_DB_PATH`: unset keeps the server's table in memory
    /// - `MOCK_LOGIN_DELAY_MS`: default 500
    /// - `MOCK_PROFILE_DELAY_MS`: default 300
    /// - `TOKEN_TTL_SECS`: default 900
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            storage_path: env_path("PENSIONADOS_STORAGE_PATH").unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH)),
            mock_db_path: env_path("PENSIONADOS_MOCK_DB_PATH"),
            latency: MockLatency {
                login: env_millis("MOCK_LOGIN_DELAY_MS", DEFAULT_LOGIN_DELAY),
                profile: env_millis("MOCK_PROFILE_DELAY_MS", DEFAULT_PROFILE_DELAY),
            },
            token_ttl: Duration::from_secs(env_parse("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL.as_secs())),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[allow(clippy::cast_possible_truncation)]
fn env_millis(key: &str, default: Duration) -> Duration {
    Duration::from_millis(env_parse(key, default.as_millis() as u64))
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
