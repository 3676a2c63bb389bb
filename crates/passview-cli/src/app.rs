//! Shared command context: config resolution and export loading.

use std::path::PathBuf;

use dialoguer::Password;
use secrecy::SecretString;

use passview_core::crypto::AgeBackend;
use passview_core::transport::HttpFetcher;
use passview_core::{AppState, Orchestrator};

use crate::cli::Cli;
use crate::config::{
    default_config_path, env_passphrase, read_config_or_default, FileConfigStore, PassviewConfig,
};
use crate::errors::CliError;
use crate::ui::{Badge, UiContext};

pub type Loader = Orchestrator<HttpFetcher, AgeBackend, FileConfigStore>;

/// Per-invocation context.
pub struct AppContext {
    config_override: Option<PathBuf>,
    pub quiet: bool,
    no_color: bool,
    ascii: bool,
}

impl AppContext {
    pub fn new(cli: &Cli) -> Self {
        Self {
            config_override: cli.config.clone(),
            quiet: cli.quiet,
            no_color: cli.no_color,
            ascii: cli.ascii,
        }
    }

    pub fn ui_context(&self, json: bool) -> UiContext {
        UiContext::from_env(json, self.no_color, self.ascii)
    }

    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config_override {
            Some(path) => Ok(path.clone()),
            None => default_config_path(),
        }
    }

    pub fn read_config(&self) -> anyhow::Result<PassviewConfig> {
        read_config_or_default(&self.config_path()?)
    }

    /// Orchestrator over the config file, honoring `PASSVIEW_PASSPHRASE`.
    pub fn loader(&self, config: &PassviewConfig) -> anyhow::Result<Loader> {
        let store =
            FileConfigStore::new(self.config_path()?).with_passphrase_override(env_passphrase());
        let fetcher = HttpFetcher::new()?;
        let base_url = config.data.base_url.clone().unwrap_or_default();
        Ok(Orchestrator::new(fetcher, AgeBackend::new(), store, base_url))
    }

    /// Load the export, mapping non-ready states to CLI errors.
    pub async fn load(&self) -> anyhow::Result<Loader> {
        let config = self.read_config()?;
        require_location(&config)?;
        let mut loader = self.loader(&config)?;
        loader.start().await;
        ensure_ready(&loader)?;
        self.report_warnings(&loader);
        Ok(loader)
    }

    /// Print structural warnings of the loaded export to stderr.
    pub fn report_warnings(&self, loader: &Loader) {
        if self.quiet {
            return;
        }
        let ui = self.ui_context(false);
        if let Some(export) = loader.export() {
            for warning in export.warnings() {
                eprintln!("{}", crate::ui::badge(&ui, Badge::Warn, &warning.to_string()));
            }
        }
    }
}

/// Whether the export can be located: an explicit URL or a base URL to derive from.
pub fn has_location(config: &PassviewConfig) -> bool {
    let set = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    set(&config.data.url) || set(&config.data.base_url)
}

pub fn require_location(config: &PassviewConfig) -> Result<(), CliError> {
    if has_location(config) {
        return Ok(());
    }
    Err(CliError::ConfigRequired {
        message: "No export URL or base URL configured".to_string(),
        hint: "Hint: Run `passview config --base-url URL` or `passview config --url URL`."
            .to_string(),
    })
}

/// Turn a finished load into a result.
pub fn ensure_ready(loader: &Loader) -> Result<(), CliError> {
    match loader.state() {
        AppState::Ready => Ok(()),
        AppState::ConfigRequired => Err(CliError::config_required(
            loader
                .message()
                .unwrap_or("Export passphrase is not configured"),
        )),
        AppState::Error(message) => Err(CliError::load_failed(message.clone())),
        AppState::Init | AppState::Loading => {
            Err(CliError::load_failed("Export was not loaded"))
        }
    }
}

/// Prompt for a passphrase on the terminal.
pub fn prompt_passphrase(prompt: &str, allow_empty: bool) -> anyhow::Result<SecretString> {
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(allow_empty)
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_location() {
        let mut config = PassviewConfig::default();
        assert!(!has_location(&config));

        config.data.url = Some("  ".to_string());
        assert!(!has_location(&config));

        config.data.base_url = Some("https://example.com/pass/".to_string());
        assert!(has_location(&config));

        config.data.base_url = None;
        config.data.url = Some("https://other/data.age".to_string());
        assert!(has_location(&config));
    }
}
