use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use passview_core::error::{PassviewError, Result as CoreResult};
use passview_core::reveal::{RevealTimeouts, DEFAULT_CLIPBOARD_CLEAR_AFTER, DEFAULT_ERASE_AFTER};
use passview_core::{ConfigStore, DataConfig};

use crate::constants::{env_vars, APP_DIR};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct PassviewConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub reveal: RevealSection,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DataSection {
    /// Explicit export URL; the location is derived when absent.
    pub url: Option<String>,
    pub passphrase: Option<String>,
    /// Base URL for derived locations.
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevealSection {
    pub timeout_seconds: u64,
    pub clipboard_clear_seconds: u64,
}

impl Default for RevealSection {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_ERASE_AFTER.as_secs(),
            clipboard_clear_seconds: DEFAULT_CLIPBOARD_CLEAR_AFTER.as_secs(),
        }
    }
}

impl RevealSection {
    pub fn timeouts(&self) -> anyhow::Result<RevealTimeouts> {
        if self.timeout_seconds == 0 || self.clipboard_clear_seconds == 0 {
            return Err(anyhow::anyhow!(
                "reveal.timeout_seconds and reveal.clipboard_clear_seconds must be positive"
            ));
        }
        Ok(RevealTimeouts {
            erase_after: Duration::from_secs(self.timeout_seconds),
            clipboard_clear_after: Duration::from_secs(self.clipboard_clear_seconds),
        })
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

/// Read the config, or the defaults if the file does not exist yet.
pub fn read_config_or_default(path: &Path) -> anyhow::Result<PassviewConfig> {
    if !path.exists() {
        return Ok(PassviewConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<PassviewConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Write the config with owner-only permissions; it holds the export passphrase.
pub fn write_config(path: &Path, config: &PassviewConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    set_file_permissions(path)?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".config").join(APP_DIR))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

fn set_file_permissions(path: &Path) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Export passphrase from `PASSVIEW_PASSPHRASE`, if set.
pub fn env_passphrase() -> Option<String> {
    std::env::var(env_vars::PASSPHRASE)
        .ok()
        .filter(|value| !value.is_empty())
}

/// [`ConfigStore`] backed by the TOML config file.
///
/// Saving only touches the `[data]` url and passphrase; other settings are
/// preserved.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    passphrase_override: Option<String>,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            passphrase_override: None,
        }
    }

    /// Use `passphrase` instead of the stored one when loading.
    pub fn with_passphrase_override(mut self, passphrase: Option<String>) -> Self {
        self.passphrase_override = passphrase;
        self
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> CoreResult<DataConfig> {
        let config = read_config_or_default(&self.path)
            .map_err(|e| PassviewError::Config(e.to_string()))?;
        let passphrase = self
            .passphrase_override
            .clone()
            .or(config.data.passphrase);
        Ok(DataConfig::new(config.data.url, passphrase))
    }

    fn save(&mut self, data: &DataConfig) -> CoreResult<()> {
        use secrecy::ExposeSecret;

        let mut config = read_config_or_default(&self.path)
            .map_err(|e| PassviewError::Config(e.to_string()))?;
        config.data.url = data.url().map(str::to_string);
        config.data.passphrase = data
            .passphrase()
            .map(|passphrase| passphrase.expose_secret().to_string());
        write_config(&self.path, &config).map_err(|e| PassviewError::Config(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), "Config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_config_or_default(&dir.path().join("config.toml")).unwrap();
        assert!(config.data.passphrase.is_none());
        assert_eq!(config.reveal.timeout_seconds, 30);
        assert_eq!(config.reveal.clipboard_clear_seconds, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[data]\npassphrase = \"p\"\n").unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.data.passphrase.as_deref(), Some("p"));
        assert_eq!(config.reveal.timeout_seconds, 30);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let section = RevealSection {
            timeout_seconds: 0,
            clipboard_clear_seconds: 30,
        };
        assert!(section.timeouts().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_config(&path, &PassviewConfig::default()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_store_save_preserves_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = PassviewConfig::default();
        config.data.base_url = Some("https://example.com/pass/".to_string());
        config.reveal.timeout_seconds = 10;
        write_config(&path, &config).unwrap();

        let mut store = FileConfigStore::new(&path);
        store
            .save(&DataConfig::new(None, Some("secret".to_string())))
            .unwrap();

        let saved = read_config(&path).unwrap();
        assert_eq!(saved.data.passphrase.as_deref(), Some("secret"));
        assert_eq!(
            saved.data.base_url.as_deref(),
            Some("https://example.com/pass/")
        );
        assert_eq!(saved.reveal.timeout_seconds, 10);
    }

    #[test]
    fn test_store_passphrase_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[data]\npassphrase = \"stored\"\n").unwrap();

        let store =
            FileConfigStore::new(&path).with_passphrase_override(Some("from-env".to_string()));
        let data = store.load().unwrap();
        assert_eq!(data.passphrase().unwrap().expose_secret(), "from-env");
    }
}
