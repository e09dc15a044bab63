use thiserror::Error;

/// Error type for the crypto crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    #[error("Key decode error: {0}")]
    KeyDecode(String),

    #[error("Key encode error: {0}")]
    KeyEncode(String),

    #[error("Signature error: {0}")]
    Signature(String),

    #[error("SPKI error: {0}")]
    SpkiError(#[from] pkcs8::spki::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
