//! HTTP route modules and the composed application router.

pub mod admin;
pub mod health;
pub mod selection;
pub mod user;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;

use crate::gate;
use crate::AppState;

/// Uniform error payload: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Logs the failure and answers with a detail-free 500.
pub fn internal_error<E: std::fmt::Display>(err: E) -> Response {
    tracing::error!("Internal error: {}", err);
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Page paths that pass the gate land here; pages are rendered by the
/// external frontend, the API answers 404.
async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not Found")
}

/// Builds the application router with every route, and the fallback,
/// behind the access gate.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(user::router(state.clone()))
        .merge(selection::router(state.clone()))
        .nest("/api/admin", admin::router(state.clone()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state, gate::access_gate))
}
