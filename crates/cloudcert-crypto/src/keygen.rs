//! Leaf key generation keyed by signature algorithm

use const_oid::ObjectIdentifier;
use rand_core::CryptoRngCore;

use crate::{
    algorithm::{algorithm_name, SignatureAlgorithm},
    asymmetric::KeyPair,
    error::{Error, Result},
};

/// Generate a fresh key pair of the kind `algorithm` signs with
///
/// P-256 for ECDSA-SHA256, 2048-bit RSA for SHA256-RSA. Entropy failures are
/// returned as [`Error::KeyGeneration`].
pub fn generate<R: CryptoRngCore>(algorithm: SignatureAlgorithm, rng: &mut R) -> Result<KeyPair> {
    (algorithm.suite().generate)(rng)
}

/// Generate a key pair for the algorithm named by an X.509 OID
///
/// Fails with [`Error::UnsupportedAlgorithm`] before touching `rng` when the
/// OID is not one of the supported algorithms.
pub fn generate_for_oid<R: CryptoRngCore>(oid: &ObjectIdentifier, rng: &mut R) -> Result<KeyPair> {
    let algorithm = SignatureAlgorithm::from_oid(oid)
        .ok_or_else(|| Error::UnsupportedAlgorithm(algorithm_name(oid)))?;
    generate(algorithm, rng)
}

/// Decode a private key in the format `algorithm` implies (SEC1 or PKCS#1)
pub fn decode_private_key(algorithm: SignatureAlgorithm, der: &[u8]) -> Result<KeyPair> {
    (algorithm.suite().decode)(der)
}

#[cfg(test)]
mod tests {
    use const_oid::db::{rfc5912, rfc8410};
    use rand_core::{CryptoRng, OsRng, RngCore};

    use super::*;

    /// Entropy source that always fails
    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            panic!("FailingRng has no entropy")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("FailingRng has no entropy")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("FailingRng has no entropy")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
            Err(rand_core::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn test_generate_p256_roundtrip() {
        let key = generate(SignatureAlgorithm::EcdsaP256Sha256, &mut OsRng).unwrap();
        assert_eq!(key.algorithm(), SignatureAlgorithm::EcdsaP256Sha256);

        let der = key.to_der().unwrap();
        let decoded = decode_private_key(SignatureAlgorithm::EcdsaP256Sha256, &der).unwrap();
        assert_eq!(
            decoded.public_key_der().unwrap(),
            key.public_key_der().unwrap()
        );
    }

    #[test]
    fn test_generate_rsa_roundtrip() {
        let key = generate(SignatureAlgorithm::RsaSha256, &mut OsRng).unwrap();
        match &key {
            KeyPair::Rsa(rsa) => assert_eq!(rsa.size(), 2048),
            KeyPair::P256(_) => panic!("expected an RSA key"),
        }

        let der = key.to_der().unwrap();
        let decoded = decode_private_key(SignatureAlgorithm::RsaSha256, &der).unwrap();
        assert_eq!(
            decoded.public_key_der().unwrap(),
            key.public_key_der().unwrap()
        );
    }

    #[test]
    fn test_generate_for_oid() {
        let key = generate_for_oid(&rfc5912::ECDSA_WITH_SHA_256, &mut OsRng).unwrap();
        assert_eq!(key.algorithm(), SignatureAlgorithm::EcdsaP256Sha256);
    }

    #[test]
    fn test_unsupported_oid_names_algorithm() {
        // FailingRng panics if drawn from, so this also proves no entropy is consumed
        let err = generate_for_oid(&rfc8410::ID_ED_25519, &mut FailingRng)
            .err()
            .expect("Ed25519 is not supported");
        match err {
            Error::UnsupportedAlgorithm(name) => assert!(name.contains("25519"), "{name}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_entropy_failure_is_reported() {
        let err = generate(SignatureAlgorithm::EcdsaP256Sha256, &mut FailingRng)
            .err()
            .expect("generation must fail");
        assert!(matches!(err, Error::KeyGeneration(_)));
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_rsa_entropy_failure_is_reported() {
        // rsa draws through fill_bytes, which FailingRng answers with a panic
        let err = generate(SignatureAlgorithm::RsaSha256, &mut FailingRng)
            .err()
            .expect("generation must fail");
        assert!(matches!(err, Error::KeyGeneration(_)));
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_decode_with_wrong_format_fails() {
        let ec = generate(SignatureAlgorithm::EcdsaP256Sha256, &mut OsRng).unwrap();
        let sec1 = ec.to_der().unwrap();

        assert!(matches!(
            decode_private_key(SignatureAlgorithm::RsaSha256, &sec1),
            Err(Error::KeyDecode(_))
        ));
    }
}
