//! Authentication middleware for bearer-token validation
//!
//! Two modes: [`auth_middleware`] rejects requests without a valid token
//! before they reach a handler, while [`optional_auth_middleware`] lets
//! anonymous requests through and only attaches an identity when a valid
//! token is present.

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information attached to request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Resolve the bearer token in `headers` to a known user, if any.
///
/// Returns None for a missing header, a malformed header, an invalid or
/// expired token, or a token whose user no longer exists.
async fn try_authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())?
        .strip_prefix("Bearer ")?;

    let claims = state.jwt_service.verify(token).ok()?;

    // The token is stateless; confirm the user it names still exists
    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .ok()
        .flatten()?;

    Some(AuthUser { id: user.id })
}

/// Mandatory authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = try_authenticate(&state, req.headers())
        .await
        .ok_or(ApiError::Unauthorized("Authentication required"))?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Optional authentication middleware
///
/// An invalid token is treated the same as no token: the request proceeds
/// without an authenticated identity.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = try_authenticate(&state, req.headers()).await {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
