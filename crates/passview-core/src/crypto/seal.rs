//! Producer-side helpers that build data in the format [`AgeBackend`] reads.
//!
//! Used by export tooling and tests; nothing in the viewer writes exports.
//!
//! [`AgeBackend`]: super::AgeBackend

use std::io::Write;
use std::iter;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{PassviewError, Result};

/// Generate a fresh X25519 identity for an export.
pub fn new_identity() -> age::x25519::Identity {
    age::x25519::Identity::generate()
}

/// Encrypt the export JSON with the shared export passphrase.
pub fn seal_export(plaintext: &[u8], passphrase: &SecretString) -> Result<Vec<u8>> {
    let encryptor = age::Encryptor::with_user_passphrase(SecretString::from(
        passphrase.expose_secret().to_string(),
    ));
    write_sealed(encryptor, plaintext)
}

/// Protect an identity with a passphrase, encoded for the `_key` entry.
pub fn seal_private_key(
    identity: &age::x25519::Identity,
    passphrase: &SecretString,
) -> Result<String> {
    let encoded = identity.to_string();
    let sealed = seal_export(encoded.expose_secret().as_bytes(), passphrase)?;
    Ok(STANDARD.encode(sealed))
}

/// Encrypt one entry to the export's recipient, encoded as an entry value.
pub fn seal_entry(plaintext: &[u8], recipient: &age::x25519::Recipient) -> Result<String> {
    let encryptor = age::Encryptor::with_recipients(iter::once(recipient as &dyn age::Recipient))
        .map_err(|e| PassviewError::Decrypt(format!("Failed to create encryptor: {}", e)))?;
    let sealed = write_sealed(encryptor, plaintext)?;
    Ok(STANDARD.encode(sealed))
}

fn write_sealed(encryptor: age::Encryptor, data: &[u8]) -> Result<Vec<u8>> {
    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| PassviewError::Decrypt(format!("Failed to create encryptor: {}", e)))?;
    writer
        .write_all(data)
        .map_err(|e| PassviewError::Decrypt(format!("Encryption write failed: {}", e)))?;
    writer
        .finish()
        .map_err(|e| PassviewError::Decrypt(format!("Encryption finish failed: {}", e)))?;
    Ok(encrypted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_entry_is_base64_and_not_plaintext() {
        let identity = new_identity();
        let sealed = seal_entry(b"plain secret", &identity.to_public()).unwrap();

        let raw = STANDARD.decode(sealed.as_bytes()).unwrap();
        assert!(!raw.is_empty());
        assert!(!sealed.contains("plain secret"));
    }
}
