//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The mock user API lives under `/api` with permissive CORS. The edge route
//! guard wraps the whole router, unmatched paths included, so `/dashboard/*`
//! and `/me/*` redirect even when no page exists there. `/api` and
//! `/healthz` fall in the guard's "other" class and always pass.

pub mod guard;
pub mod pages;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Mock user API, mounted under `/api`.
fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/users/login", post(users::login))
        .route("/users/refresh", post(users::refresh))
        .route("/users/me", get(users::me).put(users::update_me))
        .layer(cors)
        .with_state(state)
}

fn page_routes() -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login))
        .route("/dashboard", get(pages::dashboard))
        .route("/me", get(pages::profile))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state))
        .merge(page_routes())
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(guard::route_guard))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
