//! Decryption capabilities and digests.
//!
//! The load pipeline and the reveal session only see the traits below; the
//! shipped backend is [`AgeBackend`]:
//! - **Export**: age passphrase encryption (scrypt) of the JSON directory
//! - **Private key**: base64 of an age passphrase-encrypted X25519 identity
//! - **Entries**: base64 of age ciphertext to that identity's recipient
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the export blob (needs the export passphrase)
//! - Theft of the export passphrase (entries still need the key passphrase)
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to the unlocked session / memory while an entry is revealed

mod age_backend;
pub mod digest;
pub mod seal;

use secrecy::SecretString;

use crate::error::Result;
use crate::secret::{Plaintext, PrivateKeyMaterial};

pub use age_backend::{AgeBackend, UnlockedIdentity};
pub use digest::{hex_digest, HashAlgorithm};

/// Decrypts the export blob with the shared export passphrase.
pub trait ExportDecryptor {
    /// # Errors
    ///
    /// Returns `PassviewError::Decrypt` if the passphrase is wrong or the
    /// blob is corrupt.
    fn decrypt_export(&self, ciphertext: &[u8], passphrase: &SecretString) -> Result<Plaintext>;
}

/// Unlocks the export's private key and decrypts single entries with it.
pub trait EntryDecryptor {
    /// Key material after unlocking; dropped as soon as the entry is decrypted.
    type UnlockedKey;

    /// # Errors
    ///
    /// Returns `PassviewError::Decrypt` if the passphrase is wrong or the
    /// key material is corrupt.
    fn unlock_private_key(
        &self,
        material: &PrivateKeyMaterial,
        passphrase: &SecretString,
    ) -> Result<Self::UnlockedKey>;

    /// # Errors
    ///
    /// Returns `PassviewError::Decrypt` if the ciphertext was not encrypted to
    /// this key or is corrupt.
    fn decrypt_entry(&self, ciphertext: &str, key: &Self::UnlockedKey) -> Result<Plaintext>;

    /// Unlock the key and decrypt one entry with it.
    fn reveal(
        &self,
        material: &PrivateKeyMaterial,
        passphrase: &SecretString,
        ciphertext: &str,
    ) -> Result<Plaintext> {
        let key = self.unlock_private_key(material, passphrase)?;
        self.decrypt_entry(ciphertext, &key)
    }
}
