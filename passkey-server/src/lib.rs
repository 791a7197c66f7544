//! Passkey Server Library - REST API components for single-credential passkey login
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod webauthn;

pub use auth::SessionSubject;
pub use config::{Config, StoreBackend};
pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::{create_router, create_router_with_state};
pub use state::AppState;
pub use webauthn::{
    CredentialRecord, KeyValueStore, MemoryStore, PasskeyService, PostgresStore, PutOptions,
    RelyingPartyConfig, StorageError,
};
