//! Signature algorithms supported for issuance
//!
//! A CA's signature algorithm decides three things at once: how its private
//! key is decoded, what kind of leaf key is generated, and how that leaf key
//! is encoded for the caller. [`AlgorithmSuite`] keeps those three choices in
//! one table entry per algorithm.

use std::fmt;

use const_oid::{
    db::{rfc5912, DB},
    ObjectIdentifier,
};
use rand_core::CryptoRngCore;

use crate::{
    asymmetric::{p256::P256, rsa::Rsa, KeyPair},
    error::Result,
};

/// Signature algorithms a CA may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// ECDSA over NIST P-256 with SHA-256
    EcdsaP256Sha256,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaSha256,
}

/// Binary private key encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// SEC1 `ECPrivateKey` (RFC 5915)
    Sec1,
    /// PKCS#1 `RSAPrivateKey` (RFC 8017)
    Pkcs1,
}

impl KeyFormat {
    /// PEM label used when the DER form is wrapped for storage
    pub fn pem_label(self) -> &'static str {
        match self {
            KeyFormat::Sec1 => "EC PRIVATE KEY",
            KeyFormat::Pkcs1 => "RSA PRIVATE KEY",
        }
    }
}

/// Everything that depends on the signature algorithm, in one place
pub struct AlgorithmSuite {
    pub algorithm: SignatureAlgorithm,
    pub oid: ObjectIdentifier,
    pub name: &'static str,
    pub key_format: KeyFormat,
    pub(crate) generate: fn(&mut dyn CryptoRngCore) -> Result<KeyPair>,
    pub(crate) decode: fn(&[u8]) -> Result<KeyPair>,
}

static SUITES: [AlgorithmSuite; 2] = [
    AlgorithmSuite {
        algorithm: SignatureAlgorithm::EcdsaP256Sha256,
        oid: rfc5912::ECDSA_WITH_SHA_256,
        name: "ECDSA-SHA256",
        key_format: KeyFormat::Sec1,
        generate: generate_p256,
        decode: decode_sec1,
    },
    AlgorithmSuite {
        algorithm: SignatureAlgorithm::RsaSha256,
        oid: rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
        name: "SHA256-RSA",
        key_format: KeyFormat::Pkcs1,
        generate: generate_rsa,
        decode: decode_pkcs1,
    },
];

fn generate_p256(rng: &mut dyn CryptoRngCore) -> Result<KeyPair> {
    P256::generate(rng).map(KeyPair::P256)
}

fn generate_rsa(rng: &mut dyn CryptoRngCore) -> Result<KeyPair> {
    Rsa::generate_2048(rng).map(KeyPair::Rsa)
}

fn decode_sec1(der: &[u8]) -> Result<KeyPair> {
    P256::from_sec1_der(der).map(KeyPair::P256)
}

fn decode_pkcs1(der: &[u8]) -> Result<KeyPair> {
    Rsa::from_pkcs1_der(der).map(KeyPair::Rsa)
}

impl SignatureAlgorithm {
    /// All supported algorithms
    pub fn all() -> impl Iterator<Item = SignatureAlgorithm> {
        SUITES.iter().map(|suite| suite.algorithm)
    }

    /// Look up the algorithm named by an X.509 `AlgorithmIdentifier` OID
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        SUITES
            .iter()
            .find(|suite| suite.oid == *oid)
            .map(|suite| suite.algorithm)
    }

    /// The table entry for this algorithm
    pub fn suite(self) -> &'static AlgorithmSuite {
        match self {
            SignatureAlgorithm::EcdsaP256Sha256 => &SUITES[0],
            SignatureAlgorithm::RsaSha256 => &SUITES[1],
        }
    }

    pub fn oid(self) -> ObjectIdentifier {
        self.suite().oid
    }

    pub fn key_format(self) -> KeyFormat {
        self.suite().key_format
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suite().name)
    }
}

/// Human readable name for any algorithm OID, falling back to dotted form
pub fn algorithm_name(oid: &ObjectIdentifier) -> String {
    match SignatureAlgorithm::from_oid(oid) {
        Some(algorithm) => algorithm.to_string(),
        None => DB
            .by_oid(oid)
            .map(str::to_string)
            .unwrap_or_else(|| oid.to_string()),
    }
}
