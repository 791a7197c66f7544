//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::webauthn::storage::open_store;
use crate::webauthn::{PasskeyService, RelyingPartyConfig};

/// Application state containing shared resources.
#[derive(Clone, Default)]
pub struct AppState {
    /// Passkey ceremonies; `None` when no store could be opened
    pub passkeys: Option<Arc<PasskeyService>>,
}

impl AppState {
    pub fn new(service: PasskeyService) -> Self {
        Self {
            passkeys: Some(Arc::new(service)),
        }
    }

    /// State backed by a fresh in-memory store (for testing)
    pub fn in_memory(rp: RelyingPartyConfig) -> Self {
        Self::new(PasskeyService::in_memory(rp))
    }

    /// Open the configured store.
    ///
    /// A store that fails to open is logged and left unset; passkey endpoints
    /// then answer 500 until the server is restarted with a working store.
    pub async fn initialize(config: &Config, rp: RelyingPartyConfig) -> Self {
        match open_store(config).await {
            Ok(store) => {
                tracing::info!(backend = store.backend_name(), "Passkey store ready");
                Self::new(PasskeyService::new(store, rp))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to open passkey store");
                Self::default()
            }
        }
    }
}
