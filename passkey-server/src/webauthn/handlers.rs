//! Passkey HTTP endpoint handlers
//!
//! Thin adapters from axum extractors to [`PasskeyService`] operations.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    Json,
};

use super::service::PasskeyService;
use super::types::{
    AssertionCredential, AuthenticationOptions, RegistrationCredential, RegistrationOptions,
    SessionResponse, SessionStatusResponse,
};
use crate::auth::SessionSubject;
use crate::error::ApiError;
use crate::state::AppState;

/// Service for this request, or a configuration error if no store was opened
fn service(state: &AppState) -> Result<&Arc<PasskeyService>, ApiError> {
    state
        .passkeys
        .as_ref()
        .ok_or_else(|| ApiError::configuration("KV binding not configured"))
}

fn request_host(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST).and_then(|v| v.to_str().ok())
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::bad_request("Invalid JSON body")
    })
}

/// POST /passkey/register/start
///
/// Issue a registration challenge. Any earlier registration challenge is discarded.
#[utoipa::path(
    post,
    path = "/passkey/register/start",
    tag = "Passkey",
    responses(
        (status = 200, description = "Options for navigator.credentials.create", body = RegistrationOptions),
        (status = 400, description = "Relying party id could not be determined"),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn start_registration(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RegistrationOptions>, ApiError> {
    let options = service(&state)?
        .start_registration(request_host(&headers))
        .await?;
    Ok(Json(options))
}

/// POST /passkey/register/verify
///
/// Verify the browser's attestation, store the credential and open a session.
#[utoipa::path(
    post,
    path = "/passkey/register/verify",
    tag = "Passkey",
    request_body = RegistrationCredential,
    responses(
        (status = 200, description = "Credential registered", body = SessionResponse),
        (status = 400, description = "Malformed payload, attestation or key"),
        (status = 401, description = "Challenge expired or client data mismatch"),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn verify_registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationCredential>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let credential = json_body(payload)?;
    let session = service(&state)?.verify_registration(credential).await?;
    Ok(Json(session))
}

/// POST /passkey/auth/start
///
/// Issue an authentication challenge for the registered credential.
#[utoipa::path(
    post,
    path = "/passkey/auth/start",
    tag = "Passkey",
    responses(
        (status = 200, description = "Options for navigator.credentials.get", body = AuthenticationOptions),
        (status = 404, description = "No passkey registered"),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn start_authentication(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthenticationOptions>, ApiError> {
    let options = service(&state)?
        .start_authentication(request_host(&headers))
        .await?;
    Ok(Json(options))
}

/// POST /passkey/auth/verify
///
/// Verify an assertion signature with the stored key and open a session.
#[utoipa::path(
    post,
    path = "/passkey/auth/verify",
    tag = "Passkey",
    request_body = AssertionCredential,
    responses(
        (status = 200, description = "Authenticated", body = SessionResponse),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "No credential, challenge expired or signature verification failed"),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn verify_authentication(
    State(state): State<AppState>,
    payload: Result<Json<AssertionCredential>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let assertion = json_body(payload)?;
    let session = service(&state)?.verify_authentication(assertion).await?;
    Ok(Json(session))
}

/// GET /passkey/session
///
/// Resolve the Bearer session token to the credential it was issued for.
#[utoipa::path(
    get,
    path = "/passkey/session",
    tag = "Passkey",
    responses(
        (status = 200, description = "Session is live", body = SessionStatusResponse),
        (status = 401, description = "Missing, unknown or expired token")
    )
)]
pub async fn session_status(session: SessionSubject) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        ok: true,
        credential_id: session.credential_id,
    })
}
