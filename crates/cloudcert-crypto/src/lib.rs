//! cloudcert cryptography library
//!
//! Key material for leaf certificate issuance: the closed set of supported
//! signature algorithms, P-256 and RSA-2048 key pairs, and the SEC1 / PKCS#1
//! DER codecs that match each algorithm.

pub mod algorithm;
pub mod asymmetric;
pub mod error;
pub mod keygen;
pub mod rng;

pub use algorithm::{algorithm_name, AlgorithmSuite, KeyFormat, SignatureAlgorithm};
pub use asymmetric::{p256::P256, rsa::Rsa, verify_signature, KeyPair};
pub use error::{Error, Result};
pub use keygen::{decode_private_key, generate, generate_for_oid};
pub use rng::{with_guarded_rng, GuardedRng};
