//! Edge route guard — redirects before any page handler runs.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard trusts only the `auth-token` cookie. The login flow stores its
//! tokens client-side and never sets that cookie, so in practice protected
//! pages redirect to `/login` here and the page controllers' own credential
//! check is the one that gates access.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

pub const AUTH_MARKER_COOKIE: &str = "auth-token";

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const PROFILE_PATH: &str = "/me";

const PROTECTED_PREFIXES: [&str; 2] = [DASHBOARD_PATH, PROFILE_PATH];
const AUTH_ONLY_PATHS: [&str; 1] = [LOGIN_PATH];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl GuardDecision {
    #[must_use]
    pub fn location(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

/// `path` is `prefix` itself or a path below it (`/me` matches `/me/edit`, not `/metrics`).
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decide what to do with a request for `path`. Protected prefixes match whole
/// segments; `/login` matches exactly.
#[must_use]
pub fn decide(path: &str, marker_present: bool) -> GuardDecision {
    let protected = PROTECTED_PREFIXES.iter().any(|p| under(path, p));
    let auth_only = AUTH_ONLY_PATHS.contains(&path);

    if protected && !marker_present {
        return GuardDecision::RedirectToLogin;
    }
    if auth_only && marker_present {
        return GuardDecision::RedirectToDashboard;
    }
    GuardDecision::Allow
}

/// Axum middleware applying [`decide`] with the `auth-token` cookie as marker.
pub async fn route_guard(jar: CookieJar, req: Request, next: Next) -> Response {
    let marker_present = jar.get(AUTH_MARKER_COOKIE).is_some_and(|c| !c.value().is_empty());
    let decision = decide(req.uri().path(), marker_present);

    match decision.location() {
        Some(location) => {
            tracing::debug!(path = %req.uri().path(), %location, "route guard redirect");
            Redirect::temporary(location).into_response()
        }
        None => next.run(req).await,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
