//! cloudcert PKI
//!
//! Builds CA-signed leaf TLS server certificates for the cloud core and
//! checks them against their CA.

pub mod ca;
pub mod cert;
pub mod error;
pub mod host;
pub mod issuance;
pub mod settings;

pub use ca::CaMaterial;
pub use cert::{
    verify_certificate, verify_issued_by, AltNames, CertConfig, CertificateInfo, ExtKeyUsage,
};
pub use error::{PkiError, Result};
pub use host::{parse_host_ip, HostResolver, StaticHost, SystemHostResolver};
pub use issuance::{
    sign_cloud_core_cert, IssuedCertificate, Issuer, COMMON_NAME, ORGANIZATION, VALIDITY_DAYS,
};
pub use settings::IssuanceSettings;

/// Commonly used types and functions
pub mod prelude {
    pub use crate::{
        cert::{CertConfig, CertificateInfo, ExtKeyUsage},
        error::{PkiError, Result},
        host::{HostResolver, StaticHost},
        issuance::{sign_cloud_core_cert, IssuedCertificate, Issuer},
        settings::IssuanceSettings,
        verify_issued_by,
    };
}
