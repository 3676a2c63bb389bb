//! Age implementation of the decryption capabilities.
//!
//! Note: age uses scrypt internally for passphrase-based encryption, both for
//! the export blob and for the sealed private key.

use std::fmt;
use std::io::Read;
use std::iter;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use super::{EntryDecryptor, ExportDecryptor};
use crate::error::{PassviewError, Result};
use crate::secret::{Plaintext, PrivateKeyMaterial};

/// Age-based export and entry decryption.
#[derive(Debug, Default, Clone, Copy)]
pub struct AgeBackend;

impl AgeBackend {
    pub fn new() -> Self {
        Self
    }
}

/// An X25519 identity unlocked from the export's `_key` entry.
pub struct UnlockedIdentity(age::x25519::Identity);

impl UnlockedIdentity {
    pub fn recipient(&self) -> age::x25519::Recipient {
        self.0.to_public()
    }
}

impl fmt::Debug for UnlockedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedIdentity")
            .field("identity", &"[REDACTED]")
            .finish()
    }
}

impl ExportDecryptor for AgeBackend {
    fn decrypt_export(&self, ciphertext: &[u8], passphrase: &SecretString) -> Result<Plaintext> {
        let bytes = decrypt_with_passphrase(ciphertext, passphrase)?;
        Plaintext::from_utf8(bytes)
    }
}

impl EntryDecryptor for AgeBackend {
    type UnlockedKey = UnlockedIdentity;

    fn unlock_private_key(
        &self,
        material: &PrivateKeyMaterial,
        passphrase: &SecretString,
    ) -> Result<UnlockedIdentity> {
        let sealed = decode_base64(material.expose(), "private key")?;
        let decrypted = Zeroizing::new(decrypt_with_passphrase(&sealed, passphrase)?);
        let encoded = std::str::from_utf8(&decrypted)
            .map_err(|_| PassviewError::Decrypt("Private key is not valid UTF-8".to_string()))?;
        let identity = encoded
            .trim()
            .parse::<age::x25519::Identity>()
            .map_err(|e| PassviewError::Decrypt(format!("Invalid private key: {}", e)))?;
        Ok(UnlockedIdentity(identity))
    }

    fn decrypt_entry(&self, ciphertext: &str, key: &UnlockedIdentity) -> Result<Plaintext> {
        let sealed = decode_base64(ciphertext, "entry")?;
        let decryptor = age::Decryptor::new(sealed.as_slice())
            .map_err(|e| PassviewError::Decrypt(format!("Failed to create decryptor: {}", e)))?;

        let mut reader = decryptor
            .decrypt(iter::once(&key.0 as &dyn age::Identity))
            .map_err(|e| match e {
                age::DecryptError::NoMatchingKeys => {
                    PassviewError::Decrypt("Entry was not encrypted to this key".to_string())
                }
                _ => PassviewError::Decrypt(format!("Decryption failed: {}", e)),
            })?;

        let mut decrypted = Vec::new();
        reader
            .read_to_end(&mut decrypted)
            .map_err(|e| PassviewError::Decrypt(format!("Failed to read decrypted data: {}", e)))?;
        Plaintext::from_utf8(decrypted)
    }
}

/// Decrypt age passphrase-encrypted data.
fn decrypt_with_passphrase(encrypted_data: &[u8], passphrase: &SecretString) -> Result<Vec<u8>> {
    let decryptor = age::Decryptor::new(encrypted_data)
        .map_err(|e| PassviewError::Decrypt(format!("Failed to create decryptor: {}", e)))?;

    let identity =
        age::scrypt::Identity::new(SecretString::from(passphrase.expose_secret().to_string()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => {
                PassviewError::Decrypt("Incorrect passphrase".to_string())
            }
            _ => PassviewError::Decrypt(format!("Decryption failed: {}", e)),
        })?;

    let mut decrypted = Vec::new();
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| PassviewError::Decrypt(format!("Failed to read decrypted data: {}", e)))?;
    Ok(decrypted)
}

fn decode_base64(value: &str, what: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value.trim().as_bytes())
        .map_err(|e| PassviewError::Decrypt(format!("Invalid {} encoding: {}", what, e)))
}
