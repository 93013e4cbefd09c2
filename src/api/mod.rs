pub mod interactions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::decision::DecisionHandler;

/// Shared application state passed to callback handlers.
pub struct AppState {
    pub decisions: DecisionHandler,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/interactions", post(interactions::interaction_callback))
        .with_state(state)
}
