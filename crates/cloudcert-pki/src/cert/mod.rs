pub mod builder;
pub mod info;
pub mod types;
pub mod verify;

pub use builder::build;
pub use types::{AltNames, CertConfig, CertificateInfo, ExtKeyUsage};
pub use verify::{verify_certificate, verify_issued_by};
