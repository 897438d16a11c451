use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;

use crate::auth::SessionState;
use crate::gate::CurrentSession;
use crate::AppState;

use super::{internal_error, json_error};

/// Reported for users with no stored birthday; the frontend counts down
/// to this date.
const PLACEHOLDER_BIRTHDAY: &str = "2025-12-24T00:00:00.000Z";

#[derive(Serialize)]
struct BirthdayResponse {
    birthday: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCheckResponse {
    authenticated: bool,
    user_id: Option<String>,
}

async fn birthday(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    match state.store.find_user(&session.user_id) {
        Ok(Some(user)) => {
            let birthday = user
                .birthday
                .map(|d| format!("{d}T00:00:00.000Z"))
                .unwrap_or_else(|| PLACEHOLDER_BIRTHDAY.to_string());
            Json(BirthdayResponse { birthday }).into_response()
        }
        Ok(None) => json_error(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => internal_error(e),
    }
}

/// Public probe the frontend polls to decide whether to render signed-in
/// chrome. Reports whatever the gate resolved, never an error.
async fn session_check(Extension(session): Extension<SessionState>) -> Json<SessionCheckResponse> {
    match session {
        SessionState::Authenticated(session) => Json(SessionCheckResponse {
            authenticated: true,
            user_id: Some(session.user_id),
        }),
        SessionState::Anonymous => Json(SessionCheckResponse {
            authenticated: false,
            user_id: None,
        }),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/user/birthday", get(birthday))
        .route("/api/user/session-check", get(session_check))
        .with_state(state)
}
