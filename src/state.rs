//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the mock backend, whose user table is the only mutable server state.

use std::sync::Arc;

use crate::mock_api::MockApi;

/// Clone is required by Axum; inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub mock: Arc<MockApi>,
}

impl AppState {
    #[must_use]
    pub fn new(mock: MockApi) -> Self {
        Self { mock: Arc::new(mock) }
    }
}
