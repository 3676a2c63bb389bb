//! Export location derivation.
//!
//! Two addressing modes:
//! - **Fixed**: an explicit URL is used verbatim, without credentials.
//! - **Derived**: the file name is `hex(SHA-1(secret)).php` below the base
//!   URL, and `hex(SHA-256(secret))` is sent as the `Authorization` header.
//!   The server never sees the secret itself, and the two digests use
//!   different algorithms so one does not give away the other.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::crypto::digest::{hex_digest, HashAlgorithm};
use crate::error::{PassviewError, Result};

/// Header carrying the derived bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Extension of derived export file names.
const DERIVED_EXTENSION: &str = ".php";

/// Where and how to fetch the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Location {
    pub fn is_derived(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Compute the export location for `secret`.
///
/// # Errors
///
/// Returns `PassviewError::Config` in derived mode when the secret is empty
/// or the base URL cannot be parsed.
pub fn locate(secret: &SecretString, explicit_url: Option<&str>, base_url: &str) -> Result<Location> {
    if let Some(url) = explicit_url.filter(|url| !url.trim().is_empty()) {
        return Ok(Location {
            url: url.to_string(),
            headers: Vec::new(),
        });
    }

    let secret = secret.expose_secret();
    if secret.is_empty() {
        return Err(PassviewError::Config(
            "Passphrase is required to derive the export location".to_string(),
        ));
    }

    let mut url = Url::parse(base_url)
        .map_err(|e| PassviewError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(PassviewError::Config(format!(
            "Base URL cannot have a path: {}",
            base_url
        )));
    }

    let file_name = format!(
        "{}{}",
        hex_digest(secret.as_bytes(), HashAlgorithm::Sha1),
        DERIVED_EXTENSION
    );
    let path = format!("{}/{}", url.path().trim_end_matches('/'), file_name);
    url.set_path(&path);
    url.set_fragment(None);

    Ok(Location {
        url: url.to_string(),
        headers: vec![(
            AUTHORIZATION_HEADER.to_string(),
            hex_digest(secret.as_bytes(), HashAlgorithm::Sha256),
        )],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUNTER2_SHA1: &str = "f3bbbd66a63d4bf1747940578ec3d0103530e21d";
    const HUNTER2_SHA256: &str = "f52fbd32b2b3b86ff88ef6c490628285f482af15ddcb29541f94bcf526a3f6c7";

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_derived_location() {
        let location = locate(&secret("hunter2"), None, "https://example.com/pass/").unwrap();

        assert_eq!(
            location.url,
            format!("https://example.com/pass/{}.php", HUNTER2_SHA1)
        );
        assert_eq!(location.header("Authorization"), Some(HUNTER2_SHA256));
        assert!(location.is_derived());
    }

    #[test]
    fn test_derived_location_without_trailing_slash() {
        let location = locate(&secret("hunter2"), None, "https://example.com/pass").unwrap();
        assert_eq!(
            location.url,
            format!("https://example.com/pass/{}.php", HUNTER2_SHA1)
        );
    }

    #[test]
    fn test_derived_location_at_host_root() {
        let location = locate(&secret("hunter2"), Some(""), "https://example.com").unwrap();
        assert_eq!(location.url, format!("https://example.com/{}.php", HUNTER2_SHA1));
    }

    #[test]
    fn test_explicit_url_verbatim() {
        let location = locate(
            &secret("hunter2"),
            Some("https://other/data.gpg"),
            "https://example.com/pass/",
        )
        .unwrap();

        assert_eq!(location.url, "https://other/data.gpg");
        assert!(location.headers.is_empty());
        assert!(!location.is_derived());
    }

    #[test]
    fn test_explicit_url_ignores_empty_secret() {
        let location = locate(&secret(""), Some("https://other/data.gpg"), "not a url").unwrap();
        assert_eq!(location.url, "https://other/data.gpg");
    }

    #[test]
    fn test_empty_secret_in_derived_mode_is_config_error() {
        let result = locate(&secret(""), None, "https://example.com/pass/");
        assert!(matches!(result, Err(PassviewError::Config(_))));
    }

    #[test]
    fn test_whitespace_url_means_derived_mode() {
        let location = locate(&secret("hunter2"), Some("   "), "https://example.com/").unwrap();
        assert!(location.is_derived());
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = locate(&secret("hunter2"), None, "not a url");
        assert!(matches!(result, Err(PassviewError::Config(_))));
    }
}
