//! Passkey (WebAuthn) relying-party module
//!
//! Registers and authenticates a single ES256 credential and issues session
//! tokens for the admin surface.
//!
//! ## Architecture
//!
//! - `config`: Relying Party identity and lifetimes
//! - `service`: `PasskeyService`, the typed stores plus entropy
//! - `registration` / `authentication`: the two ceremonies
//! - `handlers`: HTTP endpoint handlers
//! - `storage`: key-value abstraction, memory and PostgreSQL backends
//! - `types`: Request/response types for the passkey API

mod authentication;
mod config;
pub mod handlers;
mod registration;
mod service;
pub mod storage;
#[cfg(test)]
mod test_support;
mod types;

pub use config::RelyingPartyConfig;
pub use handlers::{
    session_status, start_authentication, start_registration, verify_authentication,
    verify_registration,
};
pub use service::PasskeyService;
pub use storage::{
    CredentialRecord, KeyValueStore, MemoryStore, PostgresStore, PutOptions, StorageError,
};
pub use types::{
    AllowCredential, AssertionCredential, AssertionResponse, AttestationResponse,
    AuthenticationOptions, PubKeyCredParam, RegistrationCredential, RegistrationOptions,
    RelyingPartyEntity, SessionResponse, SessionStatusResponse, UserEntity,
};
