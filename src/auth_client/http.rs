//! HTTP transport for the auth client.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::{AuthApi, AuthError};
use crate::models::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, User, UserUpdate};

pub const LOGIN_PATH: &str = "/users/login";
pub const REFRESH_PATH: &str = "/users/refresh";
pub const ME_PATH: &str = "/users/me";

/// Speaks the `/users/*` contract against `api_base` (e.g. `http://127.0.0.1:3000/api`).
pub struct HttpAuthApi {
    http: reqwest::Client,
    api_base: String,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(api_base: &str) -> Self {
        Self { http: reqwest::Client::new(), api_base: api_base.trim_end_matches('/').to_owned() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

fn transport(e: reqwest::Error) -> AuthError {
    AuthError::Transport(e.to_string())
}

/// Decode a success body, mapping `401` to `unauthorized` and anything else to
/// a transport error.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response, unauthorized: AuthError) -> Result<T, AuthError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(unauthorized);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Transport(format!("{status}: {body}")));
    }
    resp.json::<T>().await.map_err(transport)
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let resp = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(req)
            .send()
            .await
            .map_err(transport)?;
        decode(resp, AuthError::InvalidCredentials).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let resp = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token: refresh_token.to_owned() })
            .send()
            .await
            .map_err(transport)?;
        decode(resp, AuthError::InvalidToken).await
    }

    async fn current_user(&self, access_token: &str) -> Result<User, AuthError> {
        let resp = self
            .http
            .get(self.url(ME_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;
        decode(resp, AuthError::InvalidToken).await
    }

    async fn update_user(&self, access_token: &str, update: &UserUpdate) -> Result<User, AuthError> {
        let resp = self
            .http
            .put(self.url(ME_PATH))
            .bearer_auth(access_token)
            .json(update)
            .send()
            .await
            .map_err(transport)?;
        decode(resp, AuthError::InvalidToken).await
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
