use thiserror::Error;

/// Error type for certificate issuance
///
/// Each variant names the stage that failed so callers can tell resolution,
/// parsing, generation, validation and signing failures apart.
#[derive(Error, Debug)]
pub enum PkiError {
    /// Local host identity could not be determined
    #[error("failed to get local IP address: {0}")]
    HostResolution(String),

    /// CA certificate bytes are not a DER X.509 certificate
    #[error("failed to parse a CA certificate from the given ASN.1 DER data: {0}")]
    CaParse(String),

    /// CA signs with an algorithm outside the supported set
    #[error("unsupported CA signature algorithm: {0}")]
    UnsupportedCaAlgorithm(String),

    /// CA private key bytes do not decode in the format the CA's algorithm implies
    #[error("failed to parse CA private key: {0}")]
    CaKeyParse(String),

    /// CA private key does not belong to the CA certificate
    #[error("CA private key does not match the CA certificate's public key")]
    CaKeyMismatch,

    /// Leaf key pair generation failed
    #[error("failed to generate a private key: {0}")]
    KeyGeneration(String),

    /// Certificate template has no common name
    #[error("must specify a CommonName")]
    MissingCommonName,

    /// Certificate template has no extended key usage
    #[error("must specify at least one ExtKeyUsage")]
    MissingKeyUsage,

    /// Random source failed while drawing the serial number
    #[error("failed to generate serial number: {0}")]
    SerialGeneration(String),

    /// Validity window cannot be represented
    #[error("invalid validity period: {0}")]
    InvalidValidity(String),

    /// CA signer could not produce the certificate signature
    #[error("failed to sign certificate: {0}")]
    Signing(String),

    /// X.509 builder rejected the template or the signer
    #[error("certificate build error: {0}")]
    Build(#[from] x509_cert::builder::Error),

    /// ASN.1 DER encoding or decoding error
    #[error("DER error: {0}")]
    Encoding(#[from] der::Error),

    /// Leaf private key could not be serialized
    #[error("failed to encode leaf private key: {0}")]
    KeyEncoding(String),

    /// Leaf certificate bytes are not a DER X.509 certificate
    #[error("failed to parse certificate: {0}")]
    CertificateParse(String),

    /// Certificate does not verify against its issuer
    #[error("certificate verification failed: {0}")]
    Verification(String),

    /// Certificate is past its NotAfter time
    #[error("Certificate expired")]
    CertificateExpired,

    /// Certificate is before its NotBefore time
    #[error("Certificate not yet valid")]
    CertificateNotYetValid,

    /// Settings file is malformed or inconsistent
    #[error("settings error: {0}")]
    Settings(String),

    /// Filesystem error while reading settings
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result alias for issuance operations
pub type Result<T> = std::result::Result<T, PkiError>;
