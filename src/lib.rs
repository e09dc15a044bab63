//! # cloudcert
//!
//! CA-signed leaf TLS server certificates for cloud control-plane components
//!
//! ## Crates
//!
//! - `cloudcert_crypto` - signature algorithms, key generation and key codecs
//! - `cloudcert_pki` - certificate building, issuance and verification

// Re-export all sub-crates
pub use cloudcert_crypto;
pub use cloudcert_pki;

pub use cloudcert_pki::{sign_cloud_core_cert, IssuedCertificate, Issuer, PkiError, Result};
