use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{Session, SessionState};
use crate::policy::Outcome;
use crate::routes::json_error;
use crate::AppState;

/// Access gate middleware wrapping every route.
///
/// Resolves the session cookies, classifies the path and applies the
/// gating rules. Session resolution can never fail the request; the worst
/// case is anonymous gating. Exactly one response leaves this function,
/// and a rotated token pair is attached to it at the single exit point,
/// whichever branch produced it.
pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolution = state.tokens.resolve(request.headers());
    let path = request.uri().path().to_string();
    let class = state.policy.classify(&path);
    let outcome = state
        .policy
        .decide(class, &path, resolution.state.is_authenticated());

    let mut response = match outcome {
        Outcome::Continue => {
            request.extensions_mut().insert(resolution.state);
            next.run(request).await
        }
        Outcome::Redirect(target) => Redirect::temporary(&target).into_response(),
        Outcome::Reject(status) => json_error(status, "Unauthorized"),
    };

    if let Some(pair) = &resolution.refreshed {
        state.tokens.append_cookies(response.headers_mut(), pair);
    }
    response
}

/// Extractor for the authenticated [`Session`] the gate stored on the
/// request. Rejects with the gate's own 401 body when the request carries
/// no session, so handlers behind unexpected wiring still refuse service.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<SessionState>() {
            Some(SessionState::Authenticated(session)) => Ok(CurrentSession(session.clone())),
            _ => Err(json_error(StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}
