//! Throwaway CAs for the integration tests

#![allow(dead_code)]

use std::{str::FromStr, time::Duration};

use cloudcert_crypto::{P256, Rsa};
use der::{Decode, Encode};
use rand_core::{CryptoRng, OsRng, RngCore};
use x509_cert::{
    builder::{Builder, CertificateBuilder, Profile},
    name::Name,
    serial_number::SerialNumber,
    spki::SubjectPublicKeyInfoOwned,
    time::Validity,
    Certificate,
};

const CA_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

pub struct TestCa {
    pub certificate: Certificate,
    pub cert_der: Vec<u8>,
    /// SEC1 for EC, PKCS#1 for RSA
    pub key_der: Vec<u8>,
}

/// Self-signed ECDSA-P256-SHA256 CA with a SEC1 key
pub fn ec_ca(common_name: &str) -> TestCa {
    let key = P256::generate(&mut OsRng).unwrap();
    let spki = SubjectPublicKeyInfoOwned::from_der(&key.to_spki_der().unwrap()).unwrap();
    let signing_key = key.signing_key();

    let certificate = CertificateBuilder::new(
        Profile::Root,
        SerialNumber::new(&[0x01]).unwrap(),
        Validity::from_now(CA_LIFETIME).unwrap(),
        ca_name(common_name),
        spki,
        &signing_key,
    )
    .unwrap()
    .build::<p256::ecdsa::DerSignature>()
    .unwrap();

    TestCa {
        cert_der: certificate.to_der().unwrap(),
        key_der: key.to_sec1_der().unwrap(),
        certificate,
    }
}

/// Self-signed SHA256-RSA CA with a PKCS#1 key
pub fn rsa_ca(common_name: &str) -> TestCa {
    let key = Rsa::generate_2048(&mut OsRng).unwrap();
    let spki = SubjectPublicKeyInfoOwned::from_der(&key.to_spki_der().unwrap()).unwrap();
    let signing_key = key.signing_key();

    let certificate = CertificateBuilder::new(
        Profile::Root,
        SerialNumber::new(&[0x02]).unwrap(),
        Validity::from_now(CA_LIFETIME).unwrap(),
        ca_name(common_name),
        spki,
        &signing_key,
    )
    .unwrap()
    .build::<rsa::pkcs1v15::Signature>()
    .unwrap();

    TestCa {
        cert_der: certificate.to_der().unwrap(),
        key_der: key.to_pkcs1_der().unwrap(),
        certificate,
    }
}

/// CA signed with an algorithm we do not issue under, plus its PKCS#8 key
pub fn rcgen_ca(algorithm: &'static rcgen::SignatureAlgorithm) -> (Vec<u8>, Vec<u8>) {
    let key = rcgen::KeyPair::generate_for(algorithm).unwrap();
    let mut params = rcgen::CertificateParams::new(vec!["ca.cloudcert.test".to_string()]).unwrap();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "Unsupported CA");
    params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    let cert = params.self_signed(&key).unwrap();
    (cert.der().to_vec(), key.serialize_der())
}

fn ca_name(common_name: &str) -> Name {
    Name::from_str(&format!("CN={common_name},O=cloudcert")).unwrap()
}

/// Entropy source that fails on every request
pub struct FailingRng;

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

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(rand_core::Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for FailingRng {}

/// Serves `budget` successful `try_fill_bytes` calls from the OS, then fails
pub struct ExhaustibleRng {
    pub budget: usize,
}

impl RngCore for ExhaustibleRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.try_fill_bytes(dest).unwrap()
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        if self.budget == 0 {
            return Err(rand_core::Error::new("entropy budget exhausted"));
        }
        self.budget -= 1;
        OsRng.try_fill_bytes(dest)
    }
}

impl CryptoRng for ExhaustibleRng {}
