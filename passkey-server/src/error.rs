//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use passkey_core::PasskeyError;
use thiserror::Error;

use crate::webauthn::storage::StorageError;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - stale challenge, failed check or missing session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not found - no credential registered
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server misconfiguration, e.g. no store available
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Passkey core error - error from the parsing/crypto library
    #[error("Passkey error: {0}")]
    Core(#[from] PasskeyError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Core(ref e) => match e {
                // Malformed client input → 400
                PasskeyError::Cbor(_)
                | PasskeyError::AuthenticatorData(_)
                | PasskeyError::CoseKey(_)
                | PasskeyError::AttestationObject(_)
                | PasskeyError::ClientData(_)
                | PasskeyError::Encoding(_)
                | PasskeyError::InvalidPublicKey(_) => StatusCode::BAD_REQUEST,

                PasskeyError::VerificationFailed(_) => StatusCode::UNAUTHORIZED,

                PasskeyError::Entropy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Core(ref e) => match e {
                PasskeyError::Cbor(_) => "INVALID_CBOR",
                PasskeyError::AuthenticatorData(_) => "INVALID_AUTHENTICATOR_DATA",
                PasskeyError::CoseKey(_) => "INVALID_COSE_KEY",
                PasskeyError::AttestationObject(_) => "INVALID_ATTESTATION",
                PasskeyError::ClientData(_) => "INVALID_CLIENT_DATA",
                PasskeyError::Encoding(_) => "INVALID_ENCODING",
                PasskeyError::InvalidPublicKey(_) => "INVALID_PUBLIC_KEY",
                PasskeyError::VerificationFailed(_) => "VERIFICATION_FAILED",
                PasskeyError::Entropy(_) => "ENTROPY_UNAVAILABLE",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::NotFound(m)
            | Self::Configuration(m)
            | Self::Internal(m) => m.clone(),
            Self::Core(ref e) => match e {
                PasskeyError::VerificationFailed(_) => "signature verification failed".to_string(),
                PasskeyError::Entropy(_) => "random source unavailable".to_string(),
                // Parse errors describe client input and are safe to echo
                other => other.to_string(),
            },
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Configuration(_) => "configuration",
            Self::Internal(_) => "internal",
            Self::Core(_) => "passkey",
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotConfigured(detail) => {
                tracing::error!(error = %detail, "Passkey store not configured");
                Self::configuration("KV binding not configured")
            }
            other => {
                tracing::error!(error = %other, "Passkey storage failure");
                Self::internal("storage backend failure")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Server error"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Authentication error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Client error"
            );
        }

        // All error responses include a `code` field for programmatic error handling
        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
