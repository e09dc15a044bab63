//! Reading issued certificates back

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use cloudcert_crypto::algorithm_name;
use const_oid::{db::rfc4519, ObjectIdentifier};
use der::{
    asn1::{PrintableStringRef, Utf8StringRef},
    Decode,
};
use time::OffsetDateTime;
use x509_cert::{
    ext::pkix::{
        name::GeneralName, AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage,
        SubjectAltName,
    },
    name::Name,
    time::Time,
    Certificate,
};

use super::types::{CertificateInfo, ExtKeyUsage};
use crate::error::{PkiError, Result};

impl CertificateInfo {
    /// Decode a DER certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = Certificate::from_der(der)
            .map_err(|e| PkiError::CertificateParse(e.to_string()))?;
        Self::from_certificate(&cert)
    }

    pub fn from_certificate(cert: &Certificate) -> Result<Self> {
        let tbs = &cert.tbs_certificate;

        let mut dns_names = Vec::new();
        let mut ip_addresses = Vec::new();
        if let Some((_, san)) = tbs.get::<SubjectAltName>()? {
            for name in san.0 {
                match name {
                    GeneralName::DnsName(dns) => dns_names.push(dns.to_string()),
                    GeneralName::IpAddress(octets) => {
                        if let Some(ip) = ip_from_octets(octets.as_bytes()) {
                            ip_addresses.push(ip);
                        }
                    }
                    _ => {}
                }
            }
        }

        let key_usage = match tbs.get::<KeyUsage>()? {
            Some((_, usage)) => usage.0.into_iter().map(|flag| format!("{flag:?}")).collect(),
            None => Vec::new(),
        };

        let extended_key_usage = match tbs.get::<ExtendedKeyUsage>()? {
            Some((_, usage)) => usage
                .0
                .iter()
                .map(|oid| match ExtKeyUsage::from_oid(oid) {
                    Some(known) => known.to_string(),
                    None => algorithm_name(oid),
                })
                .collect(),
            None => Vec::new(),
        };

        let is_ca = tbs
            .get::<BasicConstraints>()?
            .map(|(_, constraints)| constraints.ca)
            .unwrap_or(false);

        let authority_key_id = tbs
            .get::<AuthorityKeyIdentifier>()?
            .and_then(|(_, aki)| aki.key_identifier)
            .map(|id| hex::encode(id.as_bytes()));

        Ok(CertificateInfo {
            serial_number: hex::encode(tbs.serial_number.as_bytes()),
            subject_common_name: attribute_values(&tbs.subject, rfc4519::CN).into_iter().next(),
            subject_organization: attribute_values(&tbs.subject, rfc4519::O),
            issuer_common_name: attribute_values(&tbs.issuer, rfc4519::CN).into_iter().next(),
            not_before: to_offset_date_time(tbs.validity.not_before)?,
            not_after: to_offset_date_time(tbs.validity.not_after)?,
            dns_names,
            ip_addresses,
            key_usage,
            extended_key_usage,
            signature_algorithm: algorithm_name(&cert.signature_algorithm.oid),
            is_ca,
            authority_key_id,
        })
    }
}

/// String values of every attribute of type `oid` in `name`
fn attribute_values(name: &Name, oid: ObjectIdentifier) -> Vec<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .filter(|attr| attr.oid == oid)
        .filter_map(|attr| {
            if let Ok(utf8) = Utf8StringRef::try_from(&attr.value) {
                Some(utf8.as_str().to_string())
            } else if let Ok(printable) = PrintableStringRef::try_from(&attr.value) {
                Some(printable.as_str().to_string())
            } else {
                None
            }
        })
        .collect()
}

fn ip_from_octets(octets: &[u8]) -> Option<IpAddr> {
    match octets.len() {
        4 => {
            let bytes: [u8; 4] = octets.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(bytes)))
        }
        16 => {
            let bytes: [u8; 16] = octets.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(bytes)))
        }
        _ => None,
    }
}

pub(crate) fn to_offset_date_time(time: Time) -> Result<OffsetDateTime> {
    let seconds = i64::try_from(time.to_unix_duration().as_secs())
        .map_err(|_| PkiError::InvalidValidity("timestamp out of range".to_string()))?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| PkiError::InvalidValidity(format!("timestamp out of range: {}", e)))
}
