use std::io::IsTerminal;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Instant};
use zeroize::Zeroizing;

use passview_core::clock::{Clock, SystemClock};
use passview_core::crypto::AgeBackend;
use passview_core::reveal::{SubmitOutcome, TimerEvent};
use passview_core::secret::PrivateKeyMaterial;
use passview_core::{Node, RevealSession};
use secrecy::ExposeSecret;

use crate::app::{prompt_passphrase, AppContext};
use crate::cli::ShowArgs;
use crate::clipboard::SystemClipboard;
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::ui::screen::RevealScreen;
use crate::ui::{badge, header, hint, Badge, UiContext};

type Session = RevealSession<SystemClock, SystemClipboard>;

pub async fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let ui = ctx.ui_context(false);
    let timeouts = ctx
        .read_config()?
        .reveal
        .timeouts()
        .map_err(|e| CliError::invalid_input(e.to_string()))?;

    let loader = ctx.load().await?;
    let export = loader
        .export()
        .ok_or_else(|| CliError::load_failed("Export was not loaded"))?;

    let ciphertext = match export.tree().find(&args.path) {
        Some(Node::Leaf(ciphertext)) => ciphertext.clone(),
        Some(Node::Folder(_)) => {
            return Err(CliError::invalid_input(format!(
                "{} is a folder, not an entry",
                args.path
            ))
            .into())
        }
        None => {
            return Err(CliError::not_found(
                format!("Entry not found: {}", args.path),
                "Hint: Run `passview list` to see available entries.",
            )
            .into())
        }
    };

    let mut session = RevealSession::with_timeouts(SystemClock, SystemClipboard::detect(), timeouts);
    session.open(args.path.as_str(), ciphertext);
    unlock(&ui, &mut session, export.private_key())?;

    if args.copy {
        copy_and_wait(ctx, &ui, &mut session).await
    } else {
        display_until_closed(ctx, &ui, &mut session).await
    }
}

/// Ask for the private-key passphrase until the entry decrypts.
///
/// With `PASSVIEW_KEY_PASSPHRASE` set there is exactly one attempt.
fn unlock(ui: &UiContext, session: &mut Session, key: &PrivateKeyMaterial) -> anyhow::Result<()> {
    let backend = AgeBackend::new();

    if let Ok(value) = std::env::var(env_vars::KEY_PASSPHRASE) {
        let value = Zeroizing::new(value);
        session.input_mut().set(&value);
        return match submit(session, &backend, key)? {
            SubmitOutcome::Revealed => Ok(()),
            SubmitOutcome::Rejected(message) => Err(CliError::auth_failed_with_hint(
                message,
                "Hint: Check PASSVIEW_KEY_PASSPHRASE.",
            )
            .into()),
            SubmitOutcome::Discarded => Err(anyhow::anyhow!("Reveal session was closed")),
        };
    }

    if !ui.is_interactive() {
        return Err(CliError::invalid_input(
            "No key passphrase given; set PASSVIEW_KEY_PASSPHRASE or run interactively",
        )
        .into());
    }

    let name = session.entry_name().unwrap_or_default().to_string();
    loop {
        let entered = prompt_passphrase(&format!("Passphrase for {}", name), false)?;
        session.input_mut().set(entered.expose_secret());
        drop(entered);

        match submit(session, &backend, key)? {
            SubmitOutcome::Revealed => return Ok(()),
            SubmitOutcome::Rejected(message) => {
                eprintln!("{}", badge(ui, Badge::Err, &message));
            }
            SubmitOutcome::Discarded => {
                return Err(anyhow::anyhow!("Reveal session was closed"));
            }
        }
    }
}

/// Key derivation is slow; keep it off the async workers.
fn submit(
    session: &mut Session,
    backend: &AgeBackend,
    key: &PrivateKeyMaterial,
) -> anyhow::Result<SubmitOutcome> {
    let outcome = tokio::task::block_in_place(|| session.submit(backend, key))?;
    Ok(outcome)
}

/// Show the entry until Enter, Ctrl-C or the erase deadline, then take it
/// off the screen.
///
/// When stdout is not a terminal the entry is written once and the session
/// closes right away; there is nothing to take back.
async fn display_until_closed(
    ctx: &AppContext,
    ui: &UiContext,
    session: &mut Session,
) -> anyhow::Result<()> {
    let mut screen = RevealScreen::new(std::io::stdout(), std::io::stdout().is_terminal());
    let window = session.remaining().map(|d| d.as_secs()).unwrap_or(0);

    {
        let title = header(ui, "show", session.entry_name());
        let prompt = hint(ui, &format!("Press Enter to hide. Erased in {}s.", window));
        let mut lines = Vec::new();
        if !ctx.quiet {
            lines.push(title.as_str());
        }
        if let Some(plaintext) = session.plaintext() {
            lines.push(plaintext.expose());
        }
        if screen.can_hide() && !ctx.quiet {
            lines.push("");
            lines.push(prompt.as_str());
        }
        screen.show(&lines)?;
    }

    if !screen.can_hide() {
        session.close()?;
        return Ok(());
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut erased = false;
    while let Some(deadline) = session.next_deadline() {
        tokio::select! {
            _ = input.next_line() => {
                session.close()?;
            }
            _ = tokio::signal::ctrl_c() => {
                session.close()?;
            }
            _ = sleep_until(Instant::from_std(deadline)) => {}
        }
        erased |= session
            .poll()
            .iter()
            .any(|event| matches!(event, TimerEvent::Erased(_)));
    }
    screen.hide()?;

    if erased && !ctx.quiet {
        eprintln!(
            "{}",
            badge(ui, Badge::Info, &format!("Entry erased after {}s", window))
        );
    }
    Ok(())
}

/// Copy the first line, then wait for the clipboard clear.
async fn copy_and_wait(
    ctx: &AppContext,
    ui: &UiContext,
    session: &mut Session,
) -> anyhow::Result<()> {
    let name = session.entry_name().unwrap_or_default().to_string();
    if !session.copy_and_close()? {
        return Err(anyhow::anyhow!(
            "Could not copy {} to the clipboard (needs wl-copy, xclip or pbcopy)",
            name
        ));
    }

    let window = session
        .clipboard_clear_deadline()
        .map(|at| at.saturating_duration_since(SystemClock.now()).as_secs())
        .unwrap_or(0);
    if !ctx.quiet {
        eprintln!(
            "{}",
            badge(
                ui,
                Badge::Ok,
                &format!("Copied {}; clipboard clears in {}s", name, window)
            )
        );
    }

    while let Some(deadline) = session.next_deadline() {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.clear_clipboard_now();
                break;
            }
            _ = sleep_until(Instant::from_std(deadline)) => {}
        }
        if session.poll().contains(&TimerEvent::ClipboardCleared) && !ctx.quiet {
            eprintln!("{}", badge(ui, Badge::Info, "Clipboard cleared"));
        }
    }
    Ok(())
}
