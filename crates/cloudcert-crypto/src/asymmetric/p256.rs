use p256::{
    ecdsa::{signature::Signer, signature::Verifier, Signature, SigningKey, VerifyingKey},
    elliptic_curve::zeroize::Zeroizing,
    PublicKey, SecretKey,
};
use pkcs8::{DecodePublicKey, EncodePublicKey};
use rand_core::CryptoRngCore;

use crate::error::{Error, Result};

pub struct P256 {
    pub inner: SecretKey,
}

impl From<SecretKey> for P256 {
    fn from(value: SecretKey) -> Self {
        Self { inner: value }
    }
}

impl P256 {
    /// Generate a new P-256 key pair from `rng`
    ///
    /// Candidate scalars outside `[1, n)` are rejected and redrawn, so the
    /// result is uniform. A failing entropy source is reported, not retried.
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut candidate = Zeroizing::new([0u8; 32]);
        loop {
            rng.try_fill_bytes(&mut candidate[..]).map_err(|e| {
                Error::KeyGeneration(format!("P-256 entropy source failed: {}", e))
            })?;
            if let Ok(secret_key) = SecretKey::from_bytes((&*candidate).into()) {
                return Ok(secret_key.into());
            }
        }
    }

    /// Import from SEC1 `ECPrivateKey` DER
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_sec1_der(der)
            .map_err(|e| Error::KeyDecode(format!("invalid SEC1 P-256 private key: {}", e)))?;
        Ok(secret_key.into())
    }
}

impl P256 {
    /// Export private key to SEC1 `ECPrivateKey` DER (curve OID and public key included)
    pub fn to_sec1_der(&self) -> Result<Vec<u8>> {
        let der = self
            .inner
            .to_sec1_der()
            .map_err(|e| Error::KeyEncode(format!("SEC1 encoding failed: {}", e)))?;
        Ok(der.to_vec())
    }

    /// Export public key to SPKI DER format
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let der = self.inner.public_key().to_public_key_der()?;
        Ok(der.as_bytes().to_vec())
    }

    /// Get raw scalar bytes
    pub fn to_scalar_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }
}

impl P256 {
    /// Get the public key for this keypair
    pub fn public_key(&self) -> PublicKey {
        self.inner.public_key()
    }

    /// ECDSA signing key, as used by the certificate builder
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from(&self.inner)
    }

    /// Sign data using ECDSA with SHA-256, DER encoded signature
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = self.signing_key().sign(message);
        Ok(signature.to_der().as_bytes().to_vec())
    }

    /// Whether `spki_der` carries this key's public half
    pub fn matches_spki_der(&self, spki_der: &[u8]) -> bool {
        public_key_from_spki_der(spki_der)
            .map(|public_key| public_key == self.public_key())
            .unwrap_or(false)
    }
}

/// Verify P-256 ECDSA signature with SHA-256
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
    let verifying_key = VerifyingKey::from(public_key);
    let signature = match Signature::from_der(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// Import public key from SPKI DER format
pub fn public_key_from_spki_der(der: &[u8]) -> Result<PublicKey> {
    PublicKey::from_public_key_der(der).map_err(Into::into)
}
