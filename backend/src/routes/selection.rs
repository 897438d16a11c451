use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::gate::CurrentSession;
use crate::store::StoreError;
use crate::AppState;

use super::{internal_error, json_error};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSelectionRequest {
    /// Absent and empty both count as missing.
    #[serde(default)]
    pub gift_id: String,
}

/// Owner view of an existing claim.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionView {
    gift_id: String,
}

async fn get_selection(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    match state.store.selection_for_user(&session.user_id) {
        Ok(Some(selection)) => Json(SelectionView {
            gift_id: selection.gift_id,
        })
        .into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Not selected yet"),
        Err(e) => internal_error(e),
    }
}

/// Claims a gift for the caller. The store's uniqueness guarantee decides
/// races; a losing attempt surfaces as 409 and never overwrites.
async fn create_selection(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<CreateSelectionRequest>,
) -> Response {
    if request.gift_id.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Gift ID is required");
    }

    match state.store.create_selection(&session.user_id, &request.gift_id) {
        Ok(selection) => (StatusCode::CREATED, Json(selection)).into_response(),
        Err(StoreError::AlreadyClaimed) => {
            json_error(StatusCode::CONFLICT, "Gift already selected")
        }
        Err(StoreError::UnknownGift) => json_error(StatusCode::NOT_FOUND, "Gift not found"),
        Err(StoreError::UnknownUser) => json_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Err(e) => internal_error(e),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/gift-selection",
            get(get_selection).post(create_selection),
        )
        .with_state(state)
}
