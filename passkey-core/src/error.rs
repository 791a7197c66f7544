use thiserror::Error;

/// Low-level CBOR decoding failures.
///
/// Offsets are byte positions into the buffer handed to the decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input at offset {offset}: needed {needed} more byte(s)")]
    UnexpectedEnd { offset: usize, needed: usize },

    #[error("unsupported CBOR major type {major} at offset {offset}")]
    UnsupportedMajorType { major: u8, offset: usize },

    #[error("unsupported CBOR length encoding {additional} at offset {offset}")]
    UnsupportedLength { additional: u8, offset: usize },

    #[error("invalid UTF-8 in text string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("map key at offset {offset} is neither an integer nor a text string")]
    InvalidMapKey { offset: usize },

    #[error("nesting depth exceeds {max}")]
    DepthLimitExceeded { max: usize },

    #[error("{remaining} trailing byte(s) after item ending at offset {consumed}")]
    TrailingBytes { consumed: usize, remaining: usize },
}

#[derive(Error, Debug)]
pub enum PasskeyError {
    #[error("CBOR error: {0}")]
    Cbor(#[from] CborError),

    #[error("Invalid authenticator data: {0}")]
    AuthenticatorData(String),

    #[error("Invalid COSE key: {0}")]
    CoseKey(String),

    #[error("Invalid attestation object: {0}")]
    AttestationObject(String),

    #[error("Invalid client data: {0}")]
    ClientData(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Entropy error: {0}")]
    Entropy(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

pub type Result<T> = std::result::Result<T, PasskeyError>;
