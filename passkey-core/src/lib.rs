//! Passkey Core - WebAuthn relying-party primitives
//!
//! This crate holds the I/O-free half of a single-credential passkey server:
//! everything needed to turn browser-supplied WebAuthn payloads into verified
//! facts, with no storage or transport concerns.
//!
//! # Features
//!
//! - Bounds-checked CBOR decoder with explicit offset tracking
//! - Authenticator data and attestation object parsing
//! - COSE EC2 key to uncompressed P-256 point conversion
//! - ECDSA P-256 / SHA-256 assertion verification
//! - Challenge and session token minting from a pluggable entropy source
//!
//! # Example
//!
//! ```no_run
//! use passkey_core::{AttestationObject, cose};
//!
//! # fn example(attestation_object: &[u8]) -> passkey_core::Result<()> {
//! let attestation = AttestationObject::from_cbor(attestation_object)?;
//! let auth_data = attestation.authenticator_data()?;
//! if let Some(cose_key) = auth_data.credential_public_key() {
//!     let point = cose::to_raw_ec_key(cose_key)?;
//!     assert_eq!(point[0], 0x04);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attestation;
pub mod authenticator_data;
pub mod cbor;
pub mod client_data;
pub mod cose;
pub mod crypto;
pub mod encoding;
pub mod error;

pub use attestation::AttestationObject;
pub use authenticator_data::{AttestedCredentialData, AuthenticatorData, AuthenticatorFlags};
pub use cbor::{CborValue, Decoder, MapKey};
pub use client_data::{CeremonyType, CollectedClientData};
pub use cose::{to_raw_ec_key, COSE_ALG_ES256, RAW_EC_KEY_LEN};
pub use crypto::{EntropySource, OsEntropy};
pub use encoding::{base64url_decode, base64url_encode};
pub use error::{CborError, PasskeyError, Result};
