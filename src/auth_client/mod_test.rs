use super::*;
use crate::clock::ManualClock;
use crate::credentials::{DEFAULT_TOKEN_TTL, REFRESH_TOKEN_KEY};
use crate::mock_api::{MockApi, MockLatency, fixtures};
use crate::storage::{KeyValueStore, MemoryStore};

const T0: i64 = 1_760_000_000_000;
const PAST_TTL_MS: i64 = 15 * 60 * 1000 + 1;

struct Harness {
    client: AuthClient,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
}

fn harness_with(api: Arc<dyn AuthApi>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(T0));
    let credentials = CredentialStore::new(store.clone(), clock.clone(), DEFAULT_TOKEN_TTL);
    Harness { client: AuthClient::new(api, credentials), store, clock }
}

fn harness() -> Harness {
    harness_with(Arc::new(MockApi::in_memory(MockLatency::NONE)))
}

/// Transport whose refresh always fails; everything else is unreachable.
struct BrokenRefresh;

#[async_trait::async_trait]
impl AuthApi for BrokenRefresh {
    async fn login(&self, _req: &LoginRequest) -> Result<LoginResponse, AuthError> {
        Ok(LoginResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            user: User { id: "9".into(), name: "N".into(), email: "e".into(), created_at: "c".into() },
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        Err(AuthError::Transport("connection refused".into()))
    }

    async fn current_user(&self, _access_token: &str) -> Result<User, AuthError> {
        Err(AuthError::InvalidToken)
    }

    async fn update_user(&self, _access_token: &str, _update: &UserUpdate) -> Result<User, AuthError> {
        Err(AuthError::InvalidToken)
    }
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_stores_tokens_and_caches_user() {
    let h = harness();
    let user = h.client.login("gabriela.aguilar@linktic.com", "password123").await.unwrap();

    assert_eq!(user.id, "1");
    let creds = h.client.credentials();
    assert_eq!(creds.access_token().as_deref(), Some(fixtures::LOGIN_ACCESS_TOKEN));
    assert_eq!(creds.refresh_token().as_deref(), Some(fixtures::LOGIN_REFRESH_TOKEN));
    assert_eq!(creds.cached_user(), Some(user));
    assert!(h.client.is_authenticated());
}

#[tokio::test]
async fn login_wrong_password_stores_nothing() {
    let h = harness();
    let err = h.client.login("gabriela.aguilar@linktic.com", "nope").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(h.client.credentials().credentials(), None);
    assert!(!h.client.is_authenticated());
}

// =============================================================================
// refresh
// =============================================================================

#[tokio::test]
async fn refresh_without_stored_token_fails() {
    let h = harness();
    let err = h.client.refresh().await.unwrap_err();
    assert!(matches!(err, AuthError::MissingRefreshToken));
}

#[tokio::test]
async fn refresh_persists_new_pair() {
    let h = harness();
    h.client.login("prueba@linktic.com", "password").await.unwrap();
    let resp = h.client.refresh().await.unwrap();
    assert_eq!(resp.access_token, fixtures::REFRESHED_ACCESS_TOKEN);
    assert_eq!(
        h.client.credentials().refresh_token().as_deref(),
        Some(fixtures::REFRESHED_REFRESH_TOKEN)
    );
}

// =============================================================================
// get_valid_token
// =============================================================================

#[tokio::test]
async fn valid_token_absent_when_logged_out() {
    let h = harness();
    assert_eq!(h.client.get_valid_token().await, None);
}

#[tokio::test]
async fn valid_token_returned_unchanged_before_expiry() {
    let h = harness();
    h.client.login("prueba@linktic.com", "password").await.unwrap();
    h.clock.advance_ms(60_000);
    assert_eq!(h.client.get_valid_token().await.as_deref(), Some(fixtures::LOGIN_ACCESS_TOKEN));
}

#[tokio::test]
async fn expired_token_is_silently_refreshed() {
    let h = harness();
    h.client.login("prueba@linktic.com", "password").await.unwrap();
    h.clock.advance_ms(PAST_TTL_MS);
    assert!(h.client.credentials().is_expired());

    let token = h.client.get_valid_token().await;

    assert_eq!(token.as_deref(), Some(fixtures::REFRESHED_ACCESS_TOKEN));
    assert!(!h.client.credentials().is_expired());
    assert_eq!(h.client.credentials().expires_at(), Some(T0 + PAST_TTL_MS + 900_000));
}

#[tokio::test]
async fn expired_token_without_refresh_clears_everything() {
    let h = harness();
    h.client.login("prueba@linktic.com", "password").await.unwrap();
    h.store.remove(REFRESH_TOKEN_KEY).unwrap();
    h.clock.advance_ms(PAST_TTL_MS);

    assert_eq!(h.client.get_valid_token().await, None);
    assert_eq!(h.client.credentials().access_token(), None);
    assert_eq!(h.client.credentials().expires_at(), None);
    assert_eq!(h.client.credentials().cached_user(), None);
}

#[tokio::test]
async fn failed_refresh_clears_everything() {
    let h = harness_with(Arc::new(BrokenRefresh));
    h.client.login("x", "y").await.unwrap();
    h.clock.advance_ms(PAST_TTL_MS);

    assert_eq!(h.client.get_valid_token().await, None);
    assert_eq!(h.client.credentials().credentials(), None);
}

// =============================================================================
// profile
// =============================================================================

#[tokio::test]
async fn current_user_rejects_unknown_token() {
    let h = harness();
    let err = h.client.get_current_user("forged").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn update_name_round_trips_through_current_user() {
    let h = harness();
    h.client.login("gabriela.aguilar@linktic.com", "password123").await.unwrap();
    let token = h.client.get_valid_token().await.unwrap();
    let before = h.client.get_current_user(&token).await.unwrap();

    h.client.update_user(&token, &UserUpdate::name("X")).await.unwrap();
    let after = h.client.get_current_user(&token).await.unwrap();

    assert_eq!(after.name, "X");
    assert_eq!(after.id, before.id);
    assert_eq!(after.email, before.email);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(h.client.credentials().cached_user(), Some(after));
}

#[tokio::test]
async fn update_rejects_unknown_token() {
    let h = harness();
    let err = h.client.update_user("forged", &UserUpdate::name("X")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_local_state_only() {
    let api = Arc::new(MockApi::in_memory(MockLatency::NONE));
    let h = harness_with(api.clone());
    h.client.login("oury.santacruz@linktic.com", "password").await.unwrap();

    h.client.logout().unwrap();

    assert!(!h.client.is_authenticated());
    assert_eq!(h.client.credentials().credentials(), None);
    // No server-side invalidation: the old token still works against the API.
    let me = api.current_user(fixtures::LOGIN_ACCESS_TOKEN).await.unwrap();
    assert_eq!(me.id, "2");
}

#[tokio::test]
async fn clients_with_separate_stores_are_isolated() {
    let api: Arc<dyn AuthApi> = Arc::new(MockApi::in_memory(MockLatency::NONE));
    let a = harness_with(api.clone());
    let b = harness_with(api);

    a.client.login("prueba@linktic.com", "password").await.unwrap();

    assert!(a.client.is_authenticated());
    assert!(!b.client.is_authenticated());
}
