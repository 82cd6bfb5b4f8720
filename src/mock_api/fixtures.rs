//! Canned users and tokens served by the mock backend.

use crate::models::MockUser;

pub const LOGIN_ACCESS_TOKEN: &str = "mock-access-token-123";
pub const LOGIN_REFRESH_TOKEN: &str = "mock-refresh-token-456";
pub const REFRESHED_ACCESS_TOKEN: &str = "new-mock-access-token-789";
pub const REFRESHED_REFRESH_TOKEN: &str = "new-mock-refresh-token-012";

/// Access tokens the profile endpoints accept.
pub const RECOGNIZED_ACCESS_TOKENS: [&str; 2] = [LOGIN_ACCESS_TOKEN, REFRESHED_ACCESS_TOKEN];

/// Session user before anyone logs in.
pub const DEFAULT_CURRENT_USER_ID: &str = "1";

#[must_use]
pub fn is_recognized_token(token: &str) -> bool {
    RECOGNIZED_ACCESS_TOKENS.contains(&token)
}

fn row(id: &str, name: &str, email: &str, password: &str, created_at: &str) -> MockUser {
    MockUser {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        password: password.into(),
        created_at: created_at.into(),
    }
}

#[must_use]
pub fn initial_users() -> Vec<MockUser> {
    vec![
        row("1", "Gabriela Aguilar", "gabriela.aguilar@linktic.com", "password123", "2025-09-28T09:37:00-05:00"),
        row("2", "Oury Santacruz", "oury.santacruz@linktic.com", "password", "2024-01-15T10:30:00Z"),
        row("3", "Usuario Prueba", "prueba@linktic.com", "password", "2024-01-15T10:30:00Z"),
    ]
}
