use pkcs8::{DecodePublicKey, EncodePublicKey};
use rand_core::CryptoRngCore;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey},
    pkcs1v15,
    signature::{SignatureEncoding, Signer},
    traits::PublicKeyParts,
    RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256};

use crate::{
    error::{Error, Result},
    rng::with_guarded_rng,
};

/// Modulus size of generated leaf keys
pub const RSA_KEY_BITS: usize = 2048;

pub struct Rsa {
    pub inner: RsaPrivateKey,
}

impl From<RsaPrivateKey> for Rsa {
    fn from(value: RsaPrivateKey) -> Self {
        Self { inner: value }
    }
}

impl Rsa {
    /// Generate a new RSA key pair with the given modulus size
    ///
    /// A failing entropy source is reported as [`Error::KeyGeneration`]; the
    /// half-built key is discarded.
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R, bits: usize) -> Result<Self> {
        let private_key = with_guarded_rng(rng, |rng| RsaPrivateKey::new(rng, bits))
            .map_err(|e| {
                Error::KeyGeneration(format!("RSA-{} entropy source failed: {}", bits, e))
            })?
            .map_err(|e| {
                Error::KeyGeneration(format!("Failed to generate RSA-{} key: {}", bits, e))
            })?;
        Ok(private_key.into())
    }

    /// Generate 2048-bit RSA key (the only size issued to leaves)
    pub fn generate_2048<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        Self::generate(rng, RSA_KEY_BITS)
    }

    /// Import from PKCS#1 `RSAPrivateKey` DER
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|e| Error::KeyDecode(format!("invalid PKCS#1 RSA private key: {}", e)))?;
        Ok(private_key.into())
    }
}

impl Rsa {
    /// Export private key to PKCS#1 `RSAPrivateKey` DER
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>> {
        let der = self
            .inner
            .to_pkcs1_der()
            .map_err(|e| Error::KeyEncode(format!("PKCS#1 encoding failed: {}", e)))?;
        Ok(der.as_bytes().to_vec())
    }

    /// Export public key to SPKI DER format
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let der = self.inner.to_public_key().to_public_key_der()?;
        Ok(der.as_bytes().to_vec())
    }
}

impl Rsa {
    /// Get the public key for this keypair
    pub fn public_key(&self) -> RsaPublicKey {
        self.inner.to_public_key()
    }

    /// Get key size in bits
    pub fn size(&self) -> usize {
        self.inner.size() * 8
    }

    /// PKCS#1 v1.5 SHA-256 signing key, as used by the certificate builder
    pub fn signing_key(&self) -> pkcs1v15::SigningKey<Sha256> {
        pkcs1v15::SigningKey::<Sha256>::new(self.inner.clone())
    }

    /// Sign data using PKCS#1 v1.5 with SHA-256
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .signing_key()
            .try_sign(message)
            .map_err(|e| Error::Signature(format!("RSA signing failed: {}", e)))?;
        Ok(signature.to_vec())
    }

    /// Whether `spki_der` carries this key's public half
    pub fn matches_spki_der(&self, spki_der: &[u8]) -> bool {
        public_key_from_spki_der(spki_der)
            .map(|public_key| public_key == self.public_key())
            .unwrap_or(false)
    }
}

/// Verify RSA PKCS#1 v1.5 SHA-256 signature against an SPKI DER public key
pub fn verify_with_spki_der(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
    let public_key = public_key_from_spki_der(spki_der)?;

    let hashed = Sha256::digest(message);
    Ok(public_key
        .verify(rsa::Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        .is_ok())
}

/// Import public key from SPKI DER format
pub fn public_key_from_spki_der(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use rand_core::OsRng;

    use super::*;

    #[test]
    fn test_generate_sign_verify() {
        let key = Rsa::generate_2048(&mut OsRng).unwrap();
        assert_eq!(key.size(), 2048);

        let message = b"Hello, RSA!";
        let signature = key.sign(message).unwrap();

        let spki_der = key.to_spki_der().unwrap();
        assert!(verify_with_spki_der(&spki_der, message, &signature).unwrap());
        assert!(!verify_with_spki_der(&spki_der, b"other", &signature).unwrap());
    }

    #[test]
    fn test_pkcs1_der_roundtrip() {
        let key = Rsa::generate_2048(&mut OsRng).unwrap();

        let der = key.to_pkcs1_der().unwrap();
        let imported = Rsa::from_pkcs1_der(&der).unwrap();

        assert_eq!(key.public_key().n(), imported.public_key().n());
        assert_eq!(key.public_key().e(), imported.public_key().e());
        assert!(imported.matches_spki_der(&key.to_spki_der().unwrap()));
    }

    #[test]
    fn test_pkcs1_rejects_garbage() {
        assert!(matches!(
            Rsa::from_pkcs1_der(&[0x30, 0x03, 0x02, 0x01, 0x00]),
            Err(Error::KeyDecode(_))
        ));
    }
}
