//! Request handlers and the state they share.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use mazurka_pool::Pool;

use crate::config::Config;

pub mod users;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
}

/// All application routes, before middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
        .merge(users::routes())
}

/// Liveness probe. Never touches the database, so it answers even while
/// the pool cannot reach the server.
async fn health() -> impl IntoResponse {
    tracing::debug!("health check");
    Json(json!({ "status": "UP" }))
}

async fn root() -> &'static str {
    "Hello from the backend!"
}
