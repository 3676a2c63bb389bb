//! Clipboard access.
//!
//! Copying and clearing are best-effort: callers log failures and carry on.

use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Something that can hold copied text.
pub trait Clipboard {
    /// # Errors
    ///
    /// Returns `PassviewError::Clipboard` if the clipboard is unavailable.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// In-process clipboard, for headless use and tests.
///
/// Clones share the same content.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    content: Arc<Mutex<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> String {
        self.content
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut content = self.content.lock().unwrap_or_else(|e| e.into_inner());
        content.clear();
        content.push_str(text);
        Ok(())
    }
}
