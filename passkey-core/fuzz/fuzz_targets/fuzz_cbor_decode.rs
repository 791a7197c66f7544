#![no_main]

//! Fuzz target for the CBOR decoder
//!
//! Any input must either decode or return a `CborError`. A successful decode
//! never reports consuming more bytes than it was given.
//!
//! Run with: cargo +nightly fuzz run fuzz_cbor_decode

use libfuzzer_sys::fuzz_target;
use passkey_core::cbor;

fuzz_target!(|data: &[u8]| {
    if let Ok((_, consumed)) = cbor::decode(data) {
        assert!(consumed <= data.len());
        assert_eq!(cbor::decode_exact(data).is_ok(), consumed == data.len());
    }
});
