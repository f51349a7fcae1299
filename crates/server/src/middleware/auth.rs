//! Admin authentication for the `/v1/admin` routes.
//!
//! Admin routes are gated by a static shared-secret bearer token
//! (`ADMIN_TOKEN`). Tokens are compared with plain string equality - a known
//! weakness accepted for this threat model (a single operator token behind
//! TLS, no per-user accounts).
//!
//! # Development mode
//!
//! When `ADMIN_TOKEN` is unset the extractor lets every request through.
//! This is an explicit opt-out for local development only; the server logs
//! a warning at startup while it is active. Production deployments must set
//! a token.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid admin bearer token.
///
/// Rejects with 401 when the `Authorization: Bearer <token>` header is
/// missing or malformed, and 403 when the token doesn't match. Rejection
/// happens before the handler runs, so failed requests have no side effects.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_auth: RequireAdminToken) -> impl IntoResponse {
///     // only reached with a valid token
/// }
/// ```
#[derive(Debug)]
pub struct RequireAdminToken;

impl<S> FromRequestParts<S> for RequireAdminToken
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let Some(expected) = state.config().admin_token.as_ref() else {
            // Development mode: no token configured
            return Ok(Self);
        };

        let token =
            bearer_token(parts).ok_or_else(|| AppError::Unauthorized("Missing token".to_owned()))?;

        if token != expected.expose_secret() {
            return Err(AppError::Forbidden("Invalid token".to_owned()));
        }

        Ok(Self)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
