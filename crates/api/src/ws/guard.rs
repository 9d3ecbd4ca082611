//! Handshake authentication for notification sockets.
//!
//! Browsers cannot set headers on a WebSocket handshake, so the access token
//! travels in the `token` query parameter. A rejected handshake never
//! reaches the upgrade and never touches the session registry.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use crate::auth::jwt::{validate_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

pub const TOKEN_PARAM: &str = "token";

pub const MISSING_TOKEN_MESSAGE: &str = "Authorization required: no access token provided";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired access token";

/// Pick the token out of decoded query pairs.
///
/// A repeated `token` parameter resolves to its first occurrence. Blank
/// values count as absent.
pub fn extract_token(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Verify the handshake query and return the token's claims.
pub fn authorize(params: &[(String, String)], jwt: &JwtConfig) -> Result<Claims, AppError> {
    let token =
        extract_token(params).ok_or_else(|| AppError::unauthorized(MISSING_TOKEN_MESSAGE))?;
    validate_token(token, jwt).map_err(|err| {
        tracing::debug!(error = %err, "Rejected socket handshake");
        AppError::unauthorized(INVALID_TOKEN_MESSAGE)
    })
}

/// Claims of a socket handshake that passed [`authorize`].
#[derive(Debug, Clone)]
pub struct SocketAuth(pub Claims);

impl FromRequestParts<AppState> for SocketAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let params = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(params)| params)
            .unwrap_or_default();
        authorize(&params, &state.config.jwt).map(SocketAuth)
    }
}
