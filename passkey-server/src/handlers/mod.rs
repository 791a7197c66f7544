//! HTTP request handlers
//!
//! Service-level endpoints. Passkey ceremony handlers live in `crate::webauthn::handlers`.

pub mod health;

pub use crate::state::AppState;
pub use health::{health, ready, HealthResponse, ReadyResponse};
