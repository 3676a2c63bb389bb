//! Sensitive buffers.
//!
//! Passphrases, key material and decrypted entries are wrapped in types that
//! zeroize their backing memory on drop and never print their contents in
//! `Debug` output. Zeroization covers the buffers we own; copies made by the
//! allocator on growth, the terminal or other processes are not covered.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{PassviewError, Result};

/// Decrypted content of one entry (or of the whole export).
pub struct Plaintext(Zeroizing<String>);

impl Plaintext {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Take ownership of decrypted bytes, zeroizing them if they are not UTF-8.
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self> {
        match String::from_utf8(bytes) {
            Ok(value) => Ok(Self::new(value)),
            Err(err) => {
                let mut bytes = err.into_bytes();
                bytes.zeroize();
                Err(PassviewError::Decrypt(
                    "Decrypted content is not valid UTF-8".to_string(),
                ))
            }
        }
    }

    /// Get the plaintext.
    ///
    /// Avoid storing or logging this value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First line of the content: the password in a multi-line pass record.
    pub fn first_line(&self) -> &str {
        self.0.lines().next().unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Plaintext").field(&"[REDACTED]").finish()
    }
}

/// The UI-facing passphrase field of a reveal dialog.
///
/// The content is moved out (and the field left empty) on every submit.
#[derive(Default)]
pub struct PassphraseInput(Zeroizing<String>);

impl PassphraseInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the field content.
    pub fn set(&mut self, value: &str) {
        self.0.zeroize();
        self.0.push_str(value);
    }

    pub fn push(&mut self, c: char) {
        self.0.push(c);
    }

    pub fn clear(&mut self) {
        self.0.zeroize();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Move the content out, leaving the field empty.
    pub fn take(&mut self) -> SecretString {
        let value = std::mem::take(&mut *self.0);
        SecretString::from(value)
    }
}

impl fmt::Debug for PassphraseInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassphraseInput")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// Private key material taken from the reserved `_key` entry of an export.
///
/// Still locked: it has to be unlocked with the user's passphrase before it
/// can decrypt entries.
pub struct PrivateKeyMaterial(SecretString);

impl PrivateKeyMaterial {
    pub fn new(value: String) -> Self {
        Self(SecretString::from(value))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKeyMaterial")
            .field(&"[REDACTED]")
            .finish()
    }
}
