//! System clipboard through the platform's copy utility.

use std::io::Write;
use std::process::{Command, Stdio};

use passview_core::clipboard::Clipboard;
use passview_core::error::{PassviewError, Result};

/// Clipboard that pipes text into `wl-copy`, `xclip`, `pbcopy` or `clip`.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    program: &'static str,
    args: &'static [&'static str],
}

impl SystemClipboard {
    /// Pick the copy utility for the current session.
    pub fn detect() -> Self {
        let (program, args): (&'static str, &'static [&'static str]) = if cfg!(target_os = "macos")
        {
            ("pbcopy", &[])
        } else if cfg!(windows) {
            ("clip", &[])
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            ("wl-copy", &[])
        } else {
            ("xclip", &["-selection", "clipboard"])
        };
        Self { program, args }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut child = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PassviewError::Clipboard(format!("Failed to run {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| PassviewError::Clipboard(format!("Failed to write: {}", e)))?;
        }

        let status = child
            .wait()
            .map_err(|e| PassviewError::Clipboard(format!("{} failed: {}", self.program, e)))?;
        if !status.success() {
            return Err(PassviewError::Clipboard(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_clipboard_error() {
        let mut clipboard = SystemClipboard {
            program: "passview-no-such-clipboard-tool",
            args: &[],
        };
        let result = clipboard.write_text("x");
        assert!(matches!(result, Err(PassviewError::Clipboard(_))));
    }
}
