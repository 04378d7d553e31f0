use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use mazurka_pool::PoolError;

/// Failures a request handler can return.
///
/// `Database` covers the expected failure mode of this service; `Internal`
/// is the fallback for anything else. Clients always receive the same
/// opaque body regardless of variant; the detail goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error")]
    Database(#[from] PoolError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// The one error body clients ever see.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {}", error_chain(&self));
        (
            self.status_code(),
            Json(ErrorBody {
                error: "Internal server error",
            }),
        )
            .into_response()
    }
}

/// Render an error with its source chain, outermost first.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
