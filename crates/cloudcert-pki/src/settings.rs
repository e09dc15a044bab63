use std::{fs, net::IpAddr, path::Path};

use serde::Deserialize;

use crate::{
    cert::{AltNames, CertConfig, ExtKeyUsage},
    error::{PkiError, Result},
    issuance::{COMMON_NAME, ORGANIZATION, VALIDITY_DAYS},
};

/// Identity and lifetime of issued leaf certificates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IssuanceSettings {
    /// Subject common name (CN)
    pub common_name: String,
    /// Subject organizations (O)
    pub organization: Vec<String>,
    /// Validity in whole days
    pub validity_days: u32,
    /// Extra DNS SAN entries next to the host IP
    pub dns_names: Vec<String>,
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        Self {
            common_name: COMMON_NAME.to_string(),
            organization: vec![ORGANIZATION.to_string()],
            validity_days: VALIDITY_DAYS,
            dns_names: Vec::new(),
        }
    }
}

impl IssuanceSettings {
    /// Read settings from a TOML file; absent keys keep their defaults
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(config_path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text).map_err(|e| PkiError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.common_name.trim().is_empty() {
            return Err(PkiError::Settings("common_name must not be empty".to_string()));
        }
        if self.validity_days == 0 {
            return Err(PkiError::Settings("validity_days must be positive".to_string()));
        }
        Ok(())
    }

    /// Server-auth template for the host at `ip`
    pub fn cert_config(&self, ip: IpAddr) -> CertConfig {
        CertConfig {
            common_name: self.common_name.clone(),
            organization: self.organization.clone(),
            alt_names: AltNames {
                dns_names: self.dns_names.clone(),
                ips: vec![ip],
            },
            usages: vec![ExtKeyUsage::ServerAuth],
        }
    }
}
