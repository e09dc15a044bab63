//! CA-signed leaf certificate construction

use std::{net::IpAddr, time::Duration as StdDuration};

use cloudcert_crypto::{with_guarded_rng, KeyPair};
use const_oid::{db::rfc4519, ObjectIdentifier};
use der::{
    asn1::{GeneralizedTime, Ia5String, OctetString, SetOfVec, UtcTime, Utf8StringRef},
    Decode, DateTime, Encode,
};
use rand_core::CryptoRngCore;
use signature::{Keypair, RandomizedSigner};
use time::OffsetDateTime;
use tracing::debug;
use x509_cert::{
    attr::AttributeTypeAndValue,
    builder::{Builder, CertificateBuilder, Profile},
    ext::pkix::{
        name::GeneralName, AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage,
        KeyUsages, SubjectAltName, SubjectKeyIdentifier,
    },
    name::{Name, RdnSequence, RelativeDistinguishedName},
    serial_number::SerialNumber,
    spki::{
        DynSignatureAlgorithmIdentifier, EncodePublicKey, SignatureBitStringEncoding,
        SubjectPublicKeyInfoOwned,
    },
    time::{Time, Validity},
    Certificate,
};

use super::types::{AltNames, CertConfig};
use crate::error::{PkiError, Result};

/// First year RFC 5280 requires GeneralizedTime for
const GENERALIZED_TIME_FROM_YEAR: i32 = 2050;

/// Everything that goes into the TBS certificate besides the signer
struct Template {
    serial_number: SerialNumber,
    validity: Validity,
    issuer: Name,
    subject: Name,
    subject_public_key_info: SubjectPublicKeyInfoOwned,
    ext_key_usage: ExtendedKeyUsage,
    subject_alt_name: Option<SubjectAltName>,
    authority_key_id: Option<AuthorityKeyIdentifier>,
}

/// Build and sign a leaf certificate
///
/// # Arguments
/// * `config` - subject, SAN and extended key usages
/// * `ca_cert` - parent certificate; its subject becomes the issuer
/// * `leaf_public_key_der` - SubjectPublicKeyInfo DER of the key being certified
/// * `ca_signer` - the CA's private key
/// * `validity_days` - whole days between NotBefore and NotAfter
/// * `rng` - source for the serial number and the signature
///
/// # Returns
/// * `Result<Vec<u8>>` - DER encoded certificate
pub fn build<R: CryptoRngCore>(
    config: &CertConfig,
    ca_cert: &Certificate,
    leaf_public_key_der: &[u8],
    ca_signer: &KeyPair,
    validity_days: u32,
    rng: &mut R,
) -> Result<Vec<u8>> {
    config.validate()?;

    let serial = random_serial(rng)?;
    let validity = validity_window(OffsetDateTime::now_utc(), validity_days)?;
    debug!(serial, validity_days, "building leaf certificate");

    let template = Template {
        serial_number: serial_number(serial)?,
        validity,
        issuer: ca_cert.tbs_certificate.subject.clone(),
        subject: subject_name(&config.common_name, &config.organization)?,
        subject_public_key_info: SubjectPublicKeyInfoOwned::from_der(leaf_public_key_der)?,
        ext_key_usage: ExtendedKeyUsage(config.usages.iter().map(|usage| usage.oid()).collect()),
        subject_alt_name: subject_alt_name(&config.alt_names)?,
        authority_key_id: authority_key_id(ca_cert)?,
    };

    // signers draw through fill_bytes; entropy failures come back here
    let certificate = with_guarded_rng(rng, |rng| match ca_signer {
        KeyPair::P256(key) => {
            sign_template::<_, p256::ecdsa::DerSignature, _>(template, &key.signing_key(), rng)
        }
        KeyPair::Rsa(key) => {
            sign_template::<_, rsa::pkcs1v15::Signature, _>(template, &key.signing_key(), rng)
        }
    })
    .map_err(|e| PkiError::Signing(format!("entropy source failed: {}", e)))??;

    Ok(certificate.to_der()?)
}

fn sign_template<S, Signature, R>(template: Template, signer: &S, rng: &mut R) -> Result<Certificate>
where
    S: Keypair + DynSignatureAlgorithmIdentifier + RandomizedSigner<Signature>,
    S::VerifyingKey: EncodePublicKey,
    Signature: SignatureBitStringEncoding,
    R: CryptoRngCore,
{
    let mut builder = CertificateBuilder::new(
        Profile::Manual {
            issuer: Some(template.issuer),
        },
        template.serial_number,
        template.validity,
        template.subject,
        template.subject_public_key_info,
        signer,
    )?;

    builder.add_extension(&BasicConstraints {
        ca: false,
        path_len_constraint: None,
    })?;
    builder.add_extension(&KeyUsage(
        KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment,
    ))?;
    builder.add_extension(&template.ext_key_usage)?;
    if let Some(san) = &template.subject_alt_name {
        builder.add_extension(san)?;
    }
    if let Some(aki) = &template.authority_key_id {
        builder.add_extension(aki)?;
    }

    Ok(builder.build_with_rng::<Signature>(rng)?)
}

/// Draw a serial number uniformly from `[0, 2^63)`
pub(crate) fn random_serial<R: CryptoRngCore>(rng: &mut R) -> Result<u64> {
    let mut bytes = [0u8; 8];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| PkiError::SerialGeneration(e.to_string()))?;
    Ok(u64::from_be_bytes(bytes) >> 1)
}

/// Minimal two's complement DER INTEGER for a non-negative serial
pub(crate) fn serial_number(value: u64) -> Result<SerialNumber> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 && bytes[start] == 0 && bytes[start + 1] & 0x80 == 0 {
        start += 1;
    }
    Ok(SerialNumber::new(&bytes[start ..])?)
}

/// `[not_before, not_before + days]`, truncated to whole seconds
pub(crate) fn validity_window(not_before: OffsetDateTime, days: u32) -> Result<Validity> {
    let not_after = not_before + time::Duration::days(i64::from(days));
    Ok(Validity {
        not_before: x509_time(not_before)?,
        not_after: x509_time(not_after)?,
    })
}

fn x509_time(at: OffsetDateTime) -> Result<Time> {
    let seconds = u64::try_from(at.unix_timestamp())
        .map_err(|_| PkiError::InvalidValidity(format!("{at} is before the Unix epoch")))?;
    let date_time = DateTime::from_unix_duration(StdDuration::from_secs(seconds))?;

    if at.year() < GENERALIZED_TIME_FROM_YEAR {
        Ok(Time::UtcTime(UtcTime::from_date_time(date_time)?))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(date_time)))
    }
}

/// Subject with the organization RDNs ahead of the common name
pub(crate) fn subject_name(common_name: &str, organization: &[String]) -> Result<Name> {
    let mut rdns = Vec::with_capacity(organization.len() + 1);
    for org in organization {
        rdns.push(rdn(rfc4519::O, org)?);
    }
    rdns.push(rdn(rfc4519::CN, common_name)?);
    Ok(RdnSequence(rdns))
}

fn rdn(oid: ObjectIdentifier, value: &str) -> Result<RelativeDistinguishedName> {
    let value = Utf8StringRef::new(value)?;
    let mut set = SetOfVec::new();
    set.insert(AttributeTypeAndValue {
        oid,
        value: der::Any::from(value),
    })?;
    Ok(RelativeDistinguishedName(set))
}

fn subject_alt_name(alt_names: &AltNames) -> Result<Option<SubjectAltName>> {
    if alt_names.is_empty() {
        return Ok(None);
    }

    let mut names = Vec::with_capacity(alt_names.dns_names.len() + alt_names.ips.len());
    for dns_name in &alt_names.dns_names {
        names.push(GeneralName::DnsName(Ia5String::new(dns_name)?));
    }
    for ip in &alt_names.ips {
        let octets = match ip {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };
        names.push(GeneralName::IpAddress(OctetString::new(octets)?));
    }
    Ok(Some(SubjectAltName(names)))
}

/// AuthorityKeyIdentifier pointing at the CA's SubjectKeyIdentifier, if it has one
fn authority_key_id(ca_cert: &Certificate) -> Result<Option<AuthorityKeyIdentifier>> {
    let ski = ca_cert.tbs_certificate.get::<SubjectKeyIdentifier>()?;
    Ok(ski.map(|(_, ski)| AuthorityKeyIdentifier {
        key_identifier: Some(ski.0),
        authority_cert_issuer: None,
        authority_cert_serial_number: None,
    }))
}
