//! Page controllers — the client-side half of route protection.
//!
//! DESIGN
//! ======
//! Each page re-checks authentication against the credential store when it
//! is entered, independent of the edge guard, and answers with either a view
//! to render or a redirect. Errors never escape a controller: they become an
//! inline message or a redirect to `/login`.

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::auth_client::{AuthClient, AuthError};
use crate::models::{User, UserUpdate};
use crate::routes::guard::{DASHBOARD_PATH, LOGIN_PATH, PROFILE_PATH};

pub const MISSING_FIELDS_MESSAGE: &str = "All fields are required";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
pub const UPDATE_FAILED_MESSAGE: &str = "Could not update the profile";

/// What a page does once entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome<T> {
    Render(T),
    Redirect(&'static str),
}

// =============================================================================
// LOGIN
// =============================================================================

/// Login page entry: already-authenticated visitors go to the dashboard.
#[must_use]
pub fn login_page(client: &AuthClient) -> PageOutcome<()> {
    if client.is_authenticated() {
        PageOutcome::Redirect(DASHBOARD_PATH)
    } else {
        PageOutcome::Render(())
    }
}

/// Login form submit. `Err` carries the inline form message.
///
/// # Errors
///
/// Returns a user-facing message when a field is empty or the login fails.
pub async fn submit_login(client: &AuthClient, email: &str, password: &str) -> Result<PageOutcome<()>, String> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS_MESSAGE.to_owned());
    }

    match client.login(email.trim(), password).await {
        Ok(_) => Ok(PageOutcome::Redirect(DASHBOARD_PATH)),
        Err(AuthError::InvalidCredentials) => Err(INVALID_CREDENTIALS_MESSAGE.to_owned()),
        Err(e) => {
            tracing::warn!(error = %e, "login failed");
            Err(INVALID_CREDENTIALS_MESSAGE.to_owned())
        }
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Last profile the client saw, if any.
    pub user: Option<User>,
    pub profile_link: &'static str,
}

#[must_use]
pub fn dashboard_page(client: &AuthClient) -> PageOutcome<DashboardView> {
    if !client.is_authenticated() {
        return PageOutcome::Redirect(LOGIN_PATH);
    }
    PageOutcome::Render(DashboardView { user: client.credentials().cached_user(), profile_link: PROFILE_PATH })
}

// =============================================================================
// PROFILE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: User,
    /// `createdAt` in long form, e.g. `28 September 2025`.
    pub member_since: String,
}

impl ProfileView {
    #[must_use]
    pub fn new(user: User) -> Self {
        let member_since = long_date(&user.created_at);
        Self { user, member_since }
    }
}

/// Render an RFC 3339 timestamp as `day month year` in its own offset.
/// Unparseable input is returned unchanged.
#[must_use]
pub fn long_date(raw: &str) -> String {
    let format = format_description!("[day padding:none] [month repr:long] [year]");
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_else(|| raw.to_owned())
}

/// Profile entry: valid token, then the current user; any failure → `/login`.
pub async fn profile_page(client: &AuthClient) -> PageOutcome<ProfileView> {
    let Some(token) = client.get_valid_token().await else {
        return PageOutcome::Redirect(LOGIN_PATH);
    };
    match client.get_current_user(&token).await {
        Ok(user) => PageOutcome::Render(ProfileView::new(user)),
        Err(e) => {
            tracing::info!(error = %e, "profile load failed");
            PageOutcome::Redirect(LOGIN_PATH)
        }
    }
}

/// Profile form submit. Only the name is sent; a failed update keeps the
/// visitor on the page with an inline message.
pub async fn save_profile(client: &AuthClient, name: &str) -> PageOutcome<Result<ProfileView, String>> {
    let Some(token) = client.get_valid_token().await else {
        return PageOutcome::Redirect(LOGIN_PATH);
    };
    match client.update_user(&token, &UserUpdate::name(name)).await {
        Ok(user) => PageOutcome::Render(Ok(ProfileView::new(user))),
        Err(e) => {
            tracing::error!(error = %e, "profile update failed");
            PageOutcome::Render(Err(UPDATE_FAILED_MESSAGE.to_owned()))
        }
    }
}

// =============================================================================
// LOGOUT
// =============================================================================

/// Clear local credentials and go to `/login`. A storage failure is logged;
/// the redirect happens regardless.
#[must_use]
pub fn logout(client: &AuthClient) -> PageOutcome<()> {
    if let Err(e) = client.logout() {
        tracing::error!(error = %e, "logout failed to clear credentials");
    }
    PageOutcome::Redirect(LOGIN_PATH)
}

#[cfg(test)]
#[path = "controllers_test.rs"]
mod tests;
