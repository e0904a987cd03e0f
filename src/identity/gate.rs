//! Authorization gate: derive the caller's session from the bearer header
//! and enforce role requirements before handlers touch the store.

use axum::http::HeaderMap;

use crate::error::{AppError, AppResult};

use super::session::{Session, SessionRegistry};

/// Extract the bearer credential from the Authorization header.
/// A bare token without the `Bearer ` prefix is also accepted.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() { None } else { Some(token.to_string()) }
}

/// Resolve the caller's session or fail with 401.
pub fn authenticate(registry: &SessionRegistry, headers: &HeaderMap) -> AppResult<Session> {
    let Some(token) = bearer_token(headers) else {
        return Err(AppError::auth("unauthenticated", "not authenticated"));
    };
    registry
        .validate(&token)
        .ok_or_else(|| AppError::auth("session_expired", "invalid or expired session"))
}

/// Role check applied by every mutating endpoint.
pub fn require_admin(session: &Session) -> AppResult<()> {
    if session.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("forbidden", "admin role required"))
    }
}
