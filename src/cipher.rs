//! Password sealing.
//!
//! Passwords are sealed with AES-256-GCM under a key taken from the process
//! environment. A sealed blob is the standard base64 encoding of
//! `nonce || ciphertext || tag`, with a fresh 96-bit random nonce per seal.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretBox, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, StoreError};

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// Raw cipher key bytes, exactly as found in the environment.
pub type KeyMaterial = SecretBox<Vec<u8>>;

/// Wrap raw bytes as key material.
pub fn key_material(bytes: impl Into<Vec<u8>>) -> KeyMaterial {
    SecretBox::new(Box::new(bytes.into()))
}

/// How key material of the wrong length is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// Right-pad with zero bytes or truncate to 32 bytes.
    ///
    /// This accepts weak keys (a one-character key is valid) and exists so
    /// stores written by earlier releases stay readable.
    #[default]
    Pad,
    /// Reject anything that is not exactly 32 bytes.
    Strict,
}

pub struct Cipher {
    aead: Aes256Gcm,
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

impl Cipher {
    /// Build a cipher from raw key material.
    ///
    /// `var` names the environment variable the material came from and is
    /// only used in errors and warnings.
    pub fn new(material: Option<&KeyMaterial>, var: &str, policy: KeyPolicy) -> Result<Self> {
        let material = match material {
            Some(m) if !m.expose_secret().is_empty() => m.expose_secret().as_slice(),
            _ => {
                return Err(StoreError::KeyMissing {
                    var: var.to_string(),
                })
            }
        };

        if material.len() != KEY_SIZE {
            match policy {
                KeyPolicy::Strict => {
                    return Err(StoreError::InvalidKeyLength {
                        var: var.to_string(),
                        len: material.len(),
                    })
                }
                KeyPolicy::Pad => warn!(
                    var,
                    len = material.len(),
                    "Cipher key is not {KEY_SIZE} bytes; padding/truncating it"
                ),
            }
        }

        let mut key = [0u8; KEY_SIZE];
        let n = material.len().min(KEY_SIZE);
        key[..n].copy_from_slice(&material[..n]);
        let aead = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        key.zeroize();

        Ok(Self { aead })
    }

    /// Encrypt `plaintext` into a base64 sealed blob.
    pub fn seal(&self, plaintext: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        // aead errors are opaque; encryption only fails on absurd lengths.
        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| StoreError::SealFailure)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(blob))
    }

    /// Verify and decrypt a sealed blob.
    ///
    /// Bad base64, a blob shorter than the nonce, a failed tag check and a
    /// non-UTF-8 plaintext all fail with `AuthenticationFailure`.
    pub fn open(&self, blob: &str) -> Result<SecretString> {
        let raw = STANDARD
            .decode(blob.trim())
            .map_err(|_| StoreError::AuthenticationFailure)?;
        if raw.len() < NONCE_SIZE {
            return Err(StoreError::AuthenticationFailure);
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);

        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| StoreError::AuthenticationFailure)?;

        String::from_utf8(plaintext)
            .map(SecretString::from)
            .map_err(|_| StoreError::AuthenticationFailure)
    }
}
