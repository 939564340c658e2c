//! Asymmetric envelope primitive.
//!
//! The login payload is sealed as a single raw RSA block: no PKCS#1 or OAEP
//! padding is applied here, the codec owns the sentinel and filler bytes.
//! The modular arithmetic is the `rsa` crate's hazmat primitive; decryption is
//! blinded and checked against the public exponent.
//! [`EnvelopeCipher`] is the narrow interface the decoder and encoder use;
//! [`RsaKey`] implements it over the `rsa` crate's key types.

use crate::error::{constants, ProtocolError, Result};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::hazmat::{rsa_decrypt_and_check, rsa_encrypt};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey};
use std::fmt;
use std::path::Path;

/// Block cipher used for the login envelope
pub trait EnvelopeCipher {
    /// Size in bytes of one plaintext/ciphertext block
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt exactly one block
    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>>;
}

impl<K: EnvelopeCipher + ?Sized> EnvelopeCipher for &K {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        (**self).decrypt_block(block)
    }
}

/// RSA private key used without a padding scheme
#[derive(Clone)]
pub struct RsaKey {
    inner: RsaPrivateKey,
}

impl RsaKey {
    pub fn new(inner: RsaPrivateKey) -> Self {
        Self { inner }
    }

    /// Parse a PEM encoded key, PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`)
    pub fn from_pem(pem: &str) -> Result<Self> {
        let parsed = if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| e.to_string())
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| e.to_string())
        };

        parsed
            .map(Self::new)
            .map_err(|e| ProtocolError::KeyError(format!("{}: {e}", constants::ERR_INVALID_PEM)))
    }

    /// Parse a DER encoded key, trying PKCS#1 then PKCS#8
    pub fn from_der(der: &[u8]) -> Result<Self> {
        RsaPrivateKey::from_pkcs1_der(der)
            .or_else(|_| RsaPrivateKey::from_pkcs8_der(der))
            .map(Self::new)
            .map_err(|e| ProtocolError::KeyError(format!("{}: {e}", constants::ERR_INVALID_DER)))
    }

    /// Read and parse a PEM file
    pub fn from_pem_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pem = std::fs::read_to_string(path)?;
        Self::from_pem(&pem)
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    pub fn as_inner(&self) -> &RsaPrivateKey {
        &self.inner
    }

    fn int_to_block(&self, value: &BigUint) -> Result<Vec<u8>> {
        let size = self.inner.size();
        let bytes = value.to_bytes_be();
        if bytes.len() > size {
            return Err(ProtocolError::EnvelopeError(
                constants::ERR_BLOCK_OUT_OF_RANGE.to_string(),
            ));
        }
        let mut block = vec![0u8; size - bytes.len()];
        block.extend_from_slice(&bytes);
        Ok(block)
    }

    fn block_to_int(&self, block: &[u8]) -> Result<BigUint> {
        if block.len() != self.inner.size() {
            return Err(ProtocolError::EnvelopeError(format!(
                "Block is {} bytes, key expects {}",
                block.len(),
                self.inner.size()
            )));
        }
        let value = BigUint::from_bytes_be(block);
        if &value >= self.inner.n() {
            return Err(ProtocolError::EnvelopeError(
                constants::ERR_BLOCK_OUT_OF_RANGE.to_string(),
            ));
        }
        Ok(value)
    }
}

impl EnvelopeCipher for RsaKey {
    fn block_size(&self) -> usize {
        self.inner.size()
    }

    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        let m = self.block_to_int(block).map_err(|e| {
            ProtocolError::EnvelopeError(format!("{}: {e}", constants::ERR_ENCRYPTION_FAILED))
        })?;
        let c = rsa_encrypt(&self.inner, &m).map_err(|e| {
            ProtocolError::EnvelopeError(format!("{}: {e}", constants::ERR_ENCRYPTION_FAILED))
        })?;
        self.int_to_block(&c)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        let c = self.block_to_int(block).map_err(|e| {
            ProtocolError::EnvelopeError(format!("{}: {e}", constants::ERR_DECRYPTION_FAILED))
        })?;
        let m = rsa_decrypt_and_check(&self.inner, Some(&mut OsRng), &c).map_err(|e| {
            ProtocolError::EnvelopeError(format!("{}: {e}", constants::ERR_DECRYPTION_FAILED))
        })?;
        self.int_to_block(&m)
    }
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKey").field("bits", &self.bits()).finish()
    }
}
