//! User API routes — the `/api/users/*` contract served by the mock backend.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::mock_api::{ApiError, fixtures};
use crate::models::{ErrorBody, LoginRequest, UserUpdate};
use crate::state::AppState;

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message.to_owned() })).into_response()
}

pub(crate) fn api_error_response(err: ApiError) -> Response {
    match err {
        ApiError::InvalidCredentials => error_response(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS_MESSAGE),
        ApiError::Unauthorized => error_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE),
        ApiError::Storage(e) => {
            tracing::error!(error = %e, "mock storage failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
        }
    }
}

/// Token from `Authorization: Bearer <token>`. Missing or malformed headers yield `None`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// `POST /api/users/login`
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.mock.login(&req).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => api_error_response(e),
    }
}

/// `POST /api/users/refresh`. The body is ignored.
pub async fn refresh(State(state): State<AppState>) -> Response {
    Json(state.mock.refresh().await).into_response()
}

/// `GET /api/users/me`
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE);
    };
    match state.mock.current_user(token).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => api_error_response(e),
    }
}

/// `PUT /api/users/me`. The bearer token is checked before the body is parsed,
/// so an unrecognized token is `401` whatever the body holds.
pub async fn update_me(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE);
    };
    if !fixtures::is_recognized_token(token) {
        return api_error_response(ApiError::Unauthorized);
    }
    let update: UserUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &format!("invalid body: {e}")),
    };
    match state.mock.update_user(token, &update).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => api_error_response(e),
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
