use std::{fmt, net::IpAddr};

use const_oid::{db::rfc5280, ObjectIdentifier};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{PkiError, Result};

/// Extended key usages a leaf certificate may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtKeyUsage {
    /// TLS server authentication
    ServerAuth,
    /// TLS client authentication
    ClientAuth,
}

impl ExtKeyUsage {
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            ExtKeyUsage::ServerAuth => rfc5280::ID_KP_SERVER_AUTH,
            ExtKeyUsage::ClientAuth => rfc5280::ID_KP_CLIENT_AUTH,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        if *oid == rfc5280::ID_KP_SERVER_AUTH {
            Some(ExtKeyUsage::ServerAuth)
        } else if *oid == rfc5280::ID_KP_CLIENT_AUTH {
            Some(ExtKeyUsage::ClientAuth)
        } else {
            None
        }
    }
}

impl fmt::Display for ExtKeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtKeyUsage::ServerAuth => f.write_str("ServerAuth"),
            ExtKeyUsage::ClientAuth => f.write_str("ClientAuth"),
        }
    }
}

/// Subject alternative names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltNames {
    pub dns_names: Vec<String>,
    pub ips: Vec<IpAddr>,
}

impl AltNames {
    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty() && self.ips.is_empty()
    }
}

/// Identity and usage of the certificate being issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertConfig {
    /// Subject common name (CN)
    pub common_name: String,
    /// Subject organizations (O), in RDN order
    pub organization: Vec<String>,
    pub alt_names: AltNames,
    /// Extended key usages, must not be empty
    pub usages: Vec<ExtKeyUsage>,
}

impl CertConfig {
    /// Server certificate for a single IP address
    pub fn server(common_name: impl Into<String>, organization: Vec<String>, ip: IpAddr) -> Self {
        Self {
            common_name: common_name.into(),
            organization,
            alt_names: AltNames {
                dns_names: Vec::new(),
                ips: vec![ip],
            },
            usages: vec![ExtKeyUsage::ServerAuth],
        }
    }

    /// Check the invariants a template must satisfy before any randomness is drawn
    pub fn validate(&self) -> Result<()> {
        if self.common_name.is_empty() {
            return Err(PkiError::MissingCommonName);
        }
        if self.usages.is_empty() {
            return Err(PkiError::MissingKeyUsage);
        }
        Ok(())
    }
}

/// Fields decoded from an issued certificate
#[derive(Debug, Clone, Serialize)]
pub struct CertificateInfo {
    /// Serial number, hex of the DER INTEGER content
    pub serial_number: String,
    pub subject_common_name: Option<String>,
    pub subject_organization: Vec<String>,
    pub issuer_common_name: Option<String>,
    /// NotBefore
    #[serde(with = "time::serde::rfc3339")]
    pub not_before: OffsetDateTime,
    /// NotAfter
    #[serde(with = "time::serde::rfc3339")]
    pub not_after: OffsetDateTime,
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    /// KeyUsage bits by name
    pub key_usage: Vec<String>,
    /// ExtendedKeyUsage purposes by name
    pub extended_key_usage: Vec<String>,
    pub signature_algorithm: String,
    pub is_ca: bool,
    /// AuthorityKeyIdentifier (hex)
    pub authority_key_id: Option<String>,
}

impl CertificateInfo {
    /// Whether `time` falls inside the validity window
    pub fn is_valid_at(&self, time: OffsetDateTime) -> bool {
        time >= self.not_before && time <= self.not_after
    }

    /// Whether the certificate is valid right now
    pub fn is_currently_valid(&self) -> bool {
        self.is_valid_at(OffsetDateTime::now_utc())
    }

    /// Whole days left until NotAfter, negative once expired
    pub fn days_until_expiry(&self) -> i64 {
        let now = OffsetDateTime::now_utc();
        (self.not_after - now).whole_days()
    }

    /// Length of the validity window
    pub fn validity_period(&self) -> time::Duration {
        self.not_after - self.not_before
    }

    /// Serial number as an integer, when it fits in 64 bits
    pub fn serial_u64(&self) -> Option<u64> {
        let bytes = hex::decode(&self.serial_number).ok()?;
        let bytes = match bytes.iter().position(|b| *b != 0) {
            Some(start) => &bytes[start ..],
            None => return Some(0),
        };
        if bytes.len() > 8 {
            return None;
        }
        Some(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}
