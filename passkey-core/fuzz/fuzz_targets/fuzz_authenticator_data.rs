#![no_main]

//! Fuzz target for the registration parsing path
//!
//! Feeds the same bytes to the authenticator data parser, the attestation
//! object decoder and the COSE key converter.
//!
//! Run with: cargo +nightly fuzz run fuzz_authenticator_data

use libfuzzer_sys::fuzz_target;
use passkey_core::{cose, AttestationObject, AuthenticatorData};

fuzz_target!(|data: &[u8]| {
    if let Ok(auth_data) = AuthenticatorData::parse(data) {
        if let Some(key) = auth_data.credential_public_key() {
            let _ = cose::to_raw_ec_key(key);
        }
    }

    if let Ok(attestation) = AttestationObject::from_cbor(data) {
        let _ = attestation.authenticator_data();
    }

    let _ = cose::to_raw_ec_key(data);
});
