//! Admin API routes, nested under `/api/admin`.
//!
//! Provides:
//! - Users listing (`/api/admin/users`)
//! - Gifts listing and creation (`/api/admin/gifts`)
//! - Claims listing and revocation (`/api/admin/gift-selections`)
//!
//! Every privileged operation runs its own authority check against the
//! user record; the gate in front of these routes only proves a session.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::authority::{require_admin, AuthorityError};
use crate::gate::CurrentSession;
use crate::AppState;

use super::{internal_error, json_error};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGiftRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteSelectionRequest {
    #[serde(default)]
    pub id: String,
}

fn authority_error(err: AuthorityError) -> Response {
    match err {
        AuthorityError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
        AuthorityError::Forbidden => json_error(StatusCode::FORBIDDEN, "Forbidden"),
        AuthorityError::Store(e) => internal_error(e),
    }
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    if let Err(e) = require_admin(&state.store, &session) {
        return authority_error(e);
    }

    match state.store.list_users() {
        Ok(users) => Json(users).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Session-gated, not admin-gated: the gift page reads this listing.
async fn list_gifts(
    State(state): State<Arc<AppState>>,
    CurrentSession(_session): CurrentSession,
) -> Response {
    match state.store.list_gifts() {
        Ok(gifts) => Json(gifts).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn create_gift(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<CreateGiftRequest>,
) -> Response {
    if let Err(e) = require_admin(&state.store, &session) {
        return authority_error(e);
    }

    if request.name.is_empty() || request.description.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Name and description are required");
    }

    match state
        .store
        .create_gift(request.name, request.description, request.image_url)
    {
        Ok(gift) => (StatusCode::CREATED, Json(gift)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn list_selections(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    if let Err(e) = require_admin(&state.store, &session) {
        return authority_error(e);
    }

    match state.store.list_selections() {
        Ok(selections) => Json(selections).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Revokes a claim, returning its user to the unclaimed state. The only
/// way out of a claim; owners cannot undo their own.
async fn delete_selection(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<DeleteSelectionRequest>,
) -> Response {
    if let Err(e) = require_admin(&state.store, &session) {
        return authority_error(e);
    }

    if request.id.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Selection ID is required");
    }

    match state.store.delete_selection(&request.id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => json_error(StatusCode::NOT_FOUND, "Record to delete does not exist."),
        Err(e) => internal_error(e),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/gifts", get(list_gifts).post(create_gift))
        .route(
            "/gift-selections",
            get(list_selections).delete(delete_selection),
        )
        .with_state(state)
}
