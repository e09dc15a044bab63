//! CA certificate and signing key loaded from DER

use cloudcert_crypto::{algorithm_name, decode_private_key, KeyPair, SignatureAlgorithm};
use der::{Decode, Encode};
use tracing::debug;
use x509_cert::Certificate;

use crate::error::{PkiError, Result};

/// A CA certificate together with the private key that signs for it
pub struct CaMaterial {
    pub certificate: Certificate,
    pub signer: KeyPair,
    pub algorithm: SignatureAlgorithm,
}

impl CaMaterial {
    /// Parse the CA certificate, pick the algorithm from its signature and
    /// decode the key in the matching format
    ///
    /// # Arguments
    /// * `cert_der` - X.509 certificate, DER
    /// * `key_der` - SEC1 (EC) or PKCS#1 (RSA) private key, DER
    pub fn from_der(cert_der: &[u8], key_der: &[u8]) -> Result<Self> {
        let certificate = parse_ca_certificate(cert_der)?;
        let algorithm = select_algorithm(&certificate)?;
        let signer = parse_ca_key(algorithm, key_der)?;

        let ca_spki = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()?;
        if !signer.matches_spki_der(&ca_spki) {
            return Err(PkiError::CaKeyMismatch);
        }

        Ok(Self {
            certificate,
            signer,
            algorithm,
        })
    }
}

pub fn parse_ca_certificate(cert_der: &[u8]) -> Result<Certificate> {
    Certificate::from_der(cert_der).map_err(|e| PkiError::CaParse(e.to_string()))
}

/// Map the CA's signatureAlgorithm to one we can issue under
pub fn select_algorithm(certificate: &Certificate) -> Result<SignatureAlgorithm> {
    let oid = certificate.signature_algorithm.oid;
    let algorithm = SignatureAlgorithm::from_oid(&oid)
        .ok_or_else(|| PkiError::UnsupportedCaAlgorithm(algorithm_name(&oid)))?;
    debug!(%algorithm, "selected CA signature algorithm");
    Ok(algorithm)
}

fn parse_ca_key(algorithm: SignatureAlgorithm, key_der: &[u8]) -> Result<KeyPair> {
    decode_private_key(algorithm, key_der).map_err(|e| {
        PkiError::CaKeyParse(format!("expected {:?} for {}: {}", algorithm.key_format(), algorithm, e))
    })
}
