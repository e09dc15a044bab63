//! Leaf-to-CA chain checks

use cloudcert_crypto::{algorithm_name, verify_signature, SignatureAlgorithm};
use der::{Decode, Encode};
use time::OffsetDateTime;
use x509_cert::Certificate;

use super::info::to_offset_date_time;
use crate::error::{PkiError, Result};

/// Verify that `leaf_der` was issued by `ca_der` and is valid now
pub fn verify_issued_by(leaf_der: &[u8], ca_der: &[u8]) -> Result<()> {
    let leaf =
        Certificate::from_der(leaf_der).map_err(|e| PkiError::CertificateParse(e.to_string()))?;
    let ca = Certificate::from_der(ca_der).map_err(|e| PkiError::CaParse(e.to_string()))?;
    verify_certificate(&leaf, &ca, OffsetDateTime::now_utc())
}

/// Verify issuer name, signature and validity window at `at`
pub fn verify_certificate(leaf: &Certificate, ca: &Certificate, at: OffsetDateTime) -> Result<()> {
    if leaf.tbs_certificate.issuer != ca.tbs_certificate.subject {
        return Err(PkiError::Verification(
            "issuer does not match the CA subject".to_string(),
        ));
    }

    let oid = leaf.signature_algorithm.oid;
    let algorithm = SignatureAlgorithm::from_oid(&oid).ok_or_else(|| {
        PkiError::Verification(format!("unsupported signature algorithm {}", algorithm_name(&oid)))
    })?;

    let tbs_der = leaf.tbs_certificate.to_der()?;
    let ca_spki_der = ca.tbs_certificate.subject_public_key_info.to_der()?;
    let signature = leaf.signature.as_bytes().ok_or_else(|| {
        PkiError::Verification("signature bit string has unused bits".to_string())
    })?;

    let valid = verify_signature(algorithm, &ca_spki_der, &tbs_der, signature)
        .map_err(|e| PkiError::Verification(e.to_string()))?;
    if !valid {
        return Err(PkiError::Verification(
            "signature does not verify under the CA public key".to_string(),
        ));
    }

    let validity = &leaf.tbs_certificate.validity;
    if at < to_offset_date_time(validity.not_before)? {
        return Err(PkiError::CertificateNotYetValid);
    }
    if at > to_offset_date_time(validity.not_after)? {
        return Err(PkiError::CertificateExpired);
    }

    Ok(())
}
