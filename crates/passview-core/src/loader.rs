//! Load pipeline and application state.
//!
//! `Init -> ConfigRequired | Loading -> Ready | Error`
//!
//! Loading runs: locate -> fetch -> decrypt export -> parse -> build tree.
//! Any failure ends in `Error` with a readable message, except configuration
//! problems, which send the user back to `ConfigRequired`.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::crypto::ExportDecryptor;
use crate::error::{PassviewError, Result};
use crate::locator::locate;
use crate::secret::PrivateKeyMaterial;
use crate::transport::Fetcher;
use crate::tree::{Folder, StructuralWarning, TreeBuilder};

/// Export entries in document order. Repeated keys are kept so the tree
/// builder can report them.
struct ExportEntries(Vec<(String, String)>);

impl<'de> Deserialize<'de> for ExportEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ExportEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of entry paths to ciphertexts")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((path, ciphertext)) = map.next_entry::<String, String>()? {
                    entries.push((path, ciphertext));
                }
                Ok(ExportEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Init,
    ConfigRequired,
    Loading,
    Ready,
    Error(String),
}

/// Persisted settings: where the export lives and how to open it.
#[derive(Default)]
pub struct DataConfig {
    /// Explicit export URL; derived from the passphrase when absent.
    pub data_url: Option<String>,
    pub data_passphrase: Option<SecretString>,
}

impl DataConfig {
    pub fn new(data_url: Option<String>, data_passphrase: Option<String>) -> Self {
        Self {
            data_url,
            data_passphrase: data_passphrase.map(SecretString::from),
        }
    }

    /// The passphrase, if set and non-empty.
    pub fn passphrase(&self) -> Option<&SecretString> {
        self.data_passphrase
            .as_ref()
            .filter(|passphrase| !passphrase.expose_secret().is_empty())
    }

    /// The explicit URL, if set and not blank.
    pub fn url(&self) -> Option<&str> {
        self.data_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Whether loading can start.
    pub fn is_complete(&self) -> bool {
        self.passphrase().is_some()
    }
}

impl Clone for DataConfig {
    fn clone(&self) -> Self {
        Self {
            data_url: self.data_url.clone(),
            data_passphrase: self
                .data_passphrase
                .as_ref()
                .map(|p| SecretString::from(p.expose_secret().to_string())),
        }
    }
}

impl fmt::Debug for DataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataConfig")
            .field("data_url", &self.data_url)
            .field(
                "data_passphrase",
                &self.data_passphrase.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Storage for [`DataConfig`].
pub trait ConfigStore {
    fn load(&self) -> Result<DataConfig>;
    fn save(&mut self, config: &DataConfig) -> Result<()>;
}

/// [`ConfigStore`] kept in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigStore {
    config: DataConfig,
}

impl MemoryConfigStore {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<DataConfig> {
        Ok(self.config.clone())
    }

    fn save(&mut self, config: &DataConfig) -> Result<()> {
        self.config = config.clone();
        Ok(())
    }
}

/// A successfully loaded export.
///
/// Owns the private key material for as long as the load is current.
#[derive(Debug)]
pub struct LoadedExport {
    tree: Folder,
    private_key: PrivateKeyMaterial,
    warnings: Vec<StructuralWarning>,
}

impl LoadedExport {
    pub fn tree(&self) -> &Folder {
        &self.tree
    }

    pub fn private_key(&self) -> &PrivateKeyMaterial {
        &self.private_key
    }

    /// Structural problems found while building the tree.
    pub fn warnings(&self) -> &[StructuralWarning] {
        &self.warnings
    }
}

/// Drives loading and holds the application state.
pub struct Orchestrator<F, D, S> {
    fetcher: F,
    decryptor: D,
    store: S,
    base_url: String,
    state: AppState,
    message: Option<String>,
    export: Option<LoadedExport>,
}

impl<F, D, S> Orchestrator<F, D, S>
where
    F: Fetcher,
    D: ExportDecryptor,
    S: ConfigStore,
{
    /// `base_url` anchors derived export locations.
    pub fn new(fetcher: F, decryptor: D, store: S, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            decryptor,
            store,
            base_url: base_url.into(),
            state: AppState::Init,
            message: None,
            export: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Reason for the last `Error` or `ConfigRequired` transition, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The loaded export, only in `Ready`.
    pub fn export(&self) -> Option<&LoadedExport> {
        self.export.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the configuration and load the export if it is complete.
    pub async fn start(&mut self) -> &AppState {
        self.export = None;
        self.message = None;

        let config = match self.store.load() {
            Ok(config) => config,
            Err(err) => {
                self.fail(err);
                return &self.state;
            }
        };
        if !config.is_complete() {
            self.set_state(AppState::ConfigRequired);
            return &self.state;
        }

        self.set_state(AppState::Loading);
        match self.load(&config).await {
            Ok(export) => {
                self.export = Some(export);
                self.set_state(AppState::Ready);
            }
            Err(err) => self.fail(err),
        }
        &self.state
    }

    /// Go back to the configuration form, dropping any loaded export.
    pub fn change_config(&mut self) {
        self.export = None;
        self.message = None;
        self.set_state(AppState::ConfigRequired);
    }

    /// Persist `config` and start over with it.
    ///
    /// # Errors
    ///
    /// Returns the store's error if saving fails; the state is unchanged.
    pub async fn save_config(&mut self, config: DataConfig) -> Result<&AppState> {
        self.store.save(&config)?;
        Ok(self.start().await)
    }

    async fn load(&self, config: &DataConfig) -> Result<LoadedExport> {
        let passphrase = config.passphrase().ok_or_else(|| {
            PassviewError::Config("Export passphrase is not configured".to_string())
        })?;

        let location = locate(passphrase, config.url(), &self.base_url)?;
        let encrypted = self.fetcher.fetch(&location).await?;
        let plaintext = self.decryptor.decrypt_export(&encrypted, passphrase)?;

        let entries: ExportEntries = serde_json::from_str(plaintext.expose())
            .map_err(|e| PassviewError::Data(format!("Export is not a map of entries: {}", e)))?;
        drop(plaintext);

        let output = TreeBuilder::new().require_key(true).build(entries.0)?;
        let private_key = output.private_key.ok_or_else(|| {
            PassviewError::Data("Export has no private key".to_string())
        })?;

        tracing::debug!(
            entries = output.tree.leaf_count(),
            warnings = output.warnings.len(),
            "Export loaded"
        );
        Ok(LoadedExport {
            tree: output.tree,
            private_key,
            warnings: output.warnings,
        })
    }

    fn fail(&mut self, err: PassviewError) {
        let message = err.to_string();
        tracing::warn!(error = %message, "Loading export failed");
        self.message = Some(message.clone());
        if err.is_config() {
            self.set_state(AppState::ConfigRequired);
        } else {
            self.set_state(AppState::Error(message));
        }
    }

    fn set_state(&mut self, state: AppState) {
        tracing::debug!(from = ?self.state, to = ?state, "App state changed");
        self.state = state;
    }
}
