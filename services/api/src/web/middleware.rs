//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::token;
use crate::web::state::AppState;
use bhasha_core::CoreError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// The authenticated principal, produced once by [`require_auth`] and handed
/// to downstream handlers through request extensions. Handlers receive it by
/// construction instead of re-deriving it from raw cookies.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

/// Middleware that verifies the session cookie and attaches the principal.
///
/// Missing cookie, bad signature, or expiry all yield 401 with a JSON body.
/// The credential is re-verified on every request; there is no server-side
/// session cache.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers())
        .ok_or_else(|| CoreError::Authentication("No token provided".to_string()))?;

    let claims = token::verify(&token, &state.config.jwt_secret)?;

    req.extensions_mut().insert(AuthenticatedUser(claims.sub));
    Ok(next.run(req).await)
}

/// Extracts the session token from the `Cookie` header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(str::to_string)
    })
}
