//! Session authentication module
//!
//! Provides the `SessionSubject` extractor for Axum handlers. Tokens are the
//! opaque values minted by a successful passkey ceremony and are resolved
//! against the session store on every request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// Extract the Bearer token from the Authorization header
fn extract_bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header encoding"))?;

    auth_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use Bearer scheme"))
}

/// Caller holding a live session.
///
/// Reads `Authorization: Bearer <token>` and looks the token up in the
/// session store. Returns 401 for missing, unknown or expired tokens.
#[derive(Debug, Clone)]
pub struct SessionSubject {
    /// Credential id the session was issued for
    pub credential_id: String,
}

impl FromRequestParts<AppState> for SessionSubject {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let service = state
            .passkeys
            .as_ref()
            .ok_or_else(|| ApiError::configuration("KV binding not configured"))?;

        let credential_id = service
            .resolve_session(token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Session expired or unknown"))?;

        Ok(SessionSubject { credential_id })
    }
}
