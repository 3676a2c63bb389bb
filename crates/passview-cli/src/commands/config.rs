use secrecy::{ExposeSecret, SecretString};

use passview_core::DataConfig;

use crate::app::{ensure_ready, prompt_passphrase, require_location, AppContext};
use crate::cli::ConfigArgs;
use crate::config::{env_passphrase, read_config_or_default, write_config, PassviewConfig};
use crate::errors::CliError;
use crate::ui::{badge, kv, print, Badge, UiContext};

pub async fn handle_config(ctx: &AppContext, args: &ConfigArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_context(false);
    let path = ctx.config_path()?;
    let mut config = read_config_or_default(&path)?;

    if args.show {
        print(&ui, &kv(&ui, "Config", &path.display().to_string()));
        for line in describe(&ui, &config) {
            print(&ui, &line);
        }
        return Ok(());
    }

    if let Some(url) = &args.url {
        config.data.url = Some(url.trim().to_string());
    }
    if args.clear_url {
        config.data.url = None;
    }
    if let Some(base_url) = &args.base_url {
        config.data.base_url = Some(base_url.trim().to_string());
    }

    let passphrase = resolve_passphrase(&ui, &config)?;
    config.data.passphrase = Some(passphrase.expose_secret().to_string());
    write_config(&path, &config)?;
    require_location(&config)?;

    let mut loader = ctx.loader(&config)?;
    loader
        .save_config(DataConfig::new(
            config.data.url.clone(),
            Some(passphrase.expose_secret().to_string()),
        ))
        .await?;
    ensure_ready(&loader)?;
    ctx.report_warnings(&loader);

    if !ctx.quiet {
        let entries = loader
            .export()
            .map(|export| export.tree().leaf_count())
            .unwrap_or(0);
        print(&ui, &badge(&ui, Badge::Ok, "Configuration saved, export loaded"));
        print(&ui, &kv(&ui, "Entries", &entries.to_string()));
    }
    Ok(())
}

/// Export passphrase from the environment, or prompted; an empty answer
/// keeps the stored one.
fn resolve_passphrase(ui: &UiContext, config: &PassviewConfig) -> anyhow::Result<SecretString> {
    if let Some(passphrase) = env_passphrase() {
        return Ok(SecretString::from(passphrase));
    }
    let stored = config
        .data
        .passphrase
        .as_deref()
        .filter(|value| !value.is_empty());
    if !ui.is_interactive() {
        return match stored {
            Some(value) => Ok(SecretString::from(value.to_string())),
            None => Err(CliError::invalid_input(
                "No export passphrase given; set PASSVIEW_PASSPHRASE or run interactively",
            )
            .into()),
        };
    }

    let prompt = if stored.is_some() {
        "Export passphrase (empty keeps current)"
    } else {
        "Export passphrase"
    };
    let entered = prompt_passphrase(prompt, stored.is_some())?;
    if !entered.expose_secret().is_empty() {
        return Ok(entered);
    }
    stored
        .map(|value| SecretString::from(value.to_string()))
        .ok_or_else(|| CliError::config_required("Export passphrase is required").into())
}

/// Current settings, secrets masked.
fn describe(ui: &UiContext, config: &PassviewConfig) -> Vec<String> {
    let url = config
        .data
        .url
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("(derived)");
    let passphrase = match config.data.passphrase.as_deref() {
        Some(value) if !value.is_empty() => "set",
        _ => "not set",
    };
    vec![
        kv(ui, "URL", url),
        kv(
            ui,
            "Base URL",
            config.data.base_url.as_deref().unwrap_or("(none)"),
        ),
        kv(ui, "Passphrase", passphrase),
        kv(
            ui,
            "Reveal timeout",
            &format!("{}s", config.reveal.timeout_seconds),
        ),
        kv(
            ui,
            "Clipboard clear",
            &format!("{}s", config.reveal.clipboard_clear_seconds),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;

    #[test]
    fn test_describe_masks_passphrase() {
        let ui = UiContext {
            color: false,
            unicode: false,
            mode: OutputMode::Plain,
        };
        let mut config = PassviewConfig::default();
        config.data.passphrase = Some("hunter2".to_string());

        let lines = describe(&ui, &config).join("\n");
        assert!(lines.contains("passphrase=set"));
        assert!(lines.contains("url=(derived)"));
        assert!(lines.contains("reveal_timeout=30s"));
        assert!(!lines.contains("hunter2"));
    }
}
