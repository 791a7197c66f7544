//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 document for the passkey API.

use utoipa::OpenApi;

use crate::handlers::{HealthResponse, ReadyResponse};
use crate::webauthn::{
    AllowCredential, AssertionCredential, AssertionResponse, AttestationResponse,
    AuthenticationOptions, PubKeyCredParam, RegistrationCredential, RegistrationOptions,
    RelyingPartyEntity, SessionResponse, SessionStatusResponse, UserEntity,
};

/// Passkey API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Passkey Server",
        version = "0.1.0",
        description = r#"
## Single-credential passkey login

A minimal WebAuthn relying party guarding one admin account:

1. `POST /passkey/register/start` returns options for `navigator.credentials.create`
2. `POST /passkey/register/verify` stores the ES256 credential and returns a session token
3. `POST /passkey/auth/start` returns options for `navigator.credentials.get`
4. `POST /passkey/auth/verify` checks the assertion signature and returns a session token

Binary members are base64url. Session tokens are sent back as `Authorization: Bearer <token>`.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Passkey", description = "WebAuthn registration, authentication and sessions"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::webauthn::handlers::start_registration,
        crate::webauthn::handlers::verify_registration,
        crate::webauthn::handlers::start_authentication,
        crate::webauthn::handlers::verify_authentication,
        crate::webauthn::handlers::session_status,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            RegistrationOptions,
            RelyingPartyEntity,
            UserEntity,
            PubKeyCredParam,
            RegistrationCredential,
            AttestationResponse,
            AuthenticationOptions,
            AllowCredential,
            AssertionCredential,
            AssertionResponse,
            SessionResponse,
            SessionStatusResponse,
        )
    )
)]
pub struct ApiDoc;
