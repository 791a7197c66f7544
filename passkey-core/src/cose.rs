//! COSE_Key to raw EC point conversion (P-256 only).

use crate::cbor;
use crate::error::{PasskeyError, Result};

/// COSE key labels (RFC 9052 §7.1, RFC 9053 §7.1.1)
const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV: i64 = -1;
const LABEL_X: i64 = -2;
const LABEL_Y: i64 = -3;

const KTY_EC2: i64 = 2;
const CRV_P256: i64 = 1;

/// COSE algorithm identifier for ECDSA with SHA-256.
pub const COSE_ALG_ES256: i64 = -7;

/// Length of one P-256 field element.
pub const COORDINATE_LEN: usize = 32;

/// Length of an uncompressed SEC1 P-256 point.
pub const RAW_EC_KEY_LEN: usize = 1 + 2 * COORDINATE_LEN;

/// Convert a COSE-encoded EC2 public key into `0x04 || x || y`.
///
/// Only the first CBOR item of `cose_key` is read, so an extensions map that
/// follows the key in authenticator data is ignored.
pub fn to_raw_ec_key(cose_key: &[u8]) -> Result<[u8; RAW_EC_KEY_LEN]> {
    let (key, _consumed) = cbor::decode(cose_key)?;
    if key.as_map().is_none() {
        return Err(PasskeyError::CoseKey("expected a CBOR map".into()));
    }

    expect_label(&key, LABEL_KTY, KTY_EC2, "kty")?;
    expect_label(&key, LABEL_ALG, COSE_ALG_ES256, "alg")?;
    expect_label(&key, LABEL_CRV, CRV_P256, "crv")?;

    let x = coordinate(&key, LABEL_X, "x")?;
    let y = coordinate(&key, LABEL_Y, "y")?;

    let mut raw = [0u8; RAW_EC_KEY_LEN];
    raw[0] = 0x04;
    raw[1..1 + COORDINATE_LEN].copy_from_slice(x);
    raw[1 + COORDINATE_LEN..].copy_from_slice(y);
    Ok(raw)
}

/// An absent label is accepted; a present one must carry `expected`.
fn expect_label(key: &cbor::CborValue, label: i64, expected: i64, name: &str) -> Result<()> {
    match key.get_int(label) {
        None => Ok(()),
        Some(value) if value.as_integer() == Some(expected) => Ok(()),
        Some(value) => Err(PasskeyError::CoseKey(format!(
            "unsupported {name}: {value:?}"
        ))),
    }
}

fn coordinate<'a>(key: &'a cbor::CborValue, label: i64, name: &str) -> Result<&'a [u8]> {
    let bytes = key
        .get_int(label)
        .ok_or_else(|| PasskeyError::CoseKey(format!("missing {name} coordinate")))?
        .as_bytes()
        .ok_or_else(|| PasskeyError::CoseKey(format!("{name} coordinate is not a byte string")))?;

    if bytes.len() != COORDINATE_LEN {
        return Err(PasskeyError::CoseKey(format!(
            "{name} coordinate must be {COORDINATE_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
