//! On-demand reveal of a single entry.
//!
//! State machine: `Closed -> AwaitingPassphrase -> Revealed -> Closed`.
//!
//! - Only one entry is open at a time; opening another closes the current
//!   one first, wiping its plaintext.
//! - A failed passphrase keeps the session in `AwaitingPassphrase` with an
//!   inline error. Attempts are not limited.
//! - Revealed plaintext is erased when the erase deadline passes.
//! - Copying puts the first line on the clipboard, closes the session and
//!   schedules the clipboard to be overwritten with an empty string.
//!
//! Deadlines are plain instants owned by the session and checked by
//! [`RevealSession::poll`]; drivers sleep until
//! [`RevealSession::next_deadline`]. Decryption can run outside the session
//! through [`SubmitTicket`]s: a result whose session is gone is discarded.

use std::fmt;
use std::time::{Duration, Instant};

use secrecy::SecretString;

use crate::clipboard::Clipboard;
use crate::clock::Clock;
use crate::crypto::EntryDecryptor;
use crate::error::{PassviewError, Result};
use crate::secret::{PassphraseInput, Plaintext, PrivateKeyMaterial};

/// Default time a revealed entry stays in memory.
pub const DEFAULT_ERASE_AFTER: Duration = Duration::from_secs(30);

/// Default time before a copied password is cleared from the clipboard.
pub const DEFAULT_CLIPBOARD_CLEAR_AFTER: Duration = Duration::from_secs(30);

/// Erasure windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTimeouts {
    pub erase_after: Duration,
    pub clipboard_clear_after: Duration,
}

impl Default for RevealTimeouts {
    fn default() -> Self {
        Self {
            erase_after: DEFAULT_ERASE_AFTER,
            clipboard_clear_after: DEFAULT_CLIPBOARD_CLEAR_AFTER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Closed,
    AwaitingPassphrase,
    Revealed,
}

/// Why the last session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed by the user.
    Closed,
    /// Closed after copying to the clipboard.
    Copied,
    /// Erased by the deadline.
    Expired,
    /// Another entry was opened.
    Replaced,
}

/// Identity of one opened session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The entry is now revealed.
    Revealed,
    /// Unlock or decrypt failed; the message is shown inline.
    Rejected(String),
    /// The session this attempt belonged to is gone.
    Discarded,
}

/// Something [`RevealSession::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Erased(SessionId),
    ClipboardCleared,
}

/// A passphrase submission in flight.
pub struct SubmitTicket {
    session: SessionId,
    ciphertext: String,
    passphrase: SecretString,
}

impl SubmitTicket {
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Unlock `key` with the submitted passphrase and decrypt the entry.
    pub fn run<D: EntryDecryptor>(&self, decryptor: &D, key: &PrivateKeyMaterial) -> Result<Plaintext> {
        decryptor.reveal(key, &self.passphrase, &self.ciphertext)
    }
}

impl fmt::Debug for SubmitTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitTicket")
            .field("session", &self.session)
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

struct ActiveEntry {
    id: SessionId,
    name: String,
    ciphertext: String,
    plaintext: Option<Plaintext>,
    erase_at: Option<Instant>,
    error: Option<String>,
}

/// The reveal dialog: at most one open entry, its passphrase field and timers.
pub struct RevealSession<C: Clock, B: Clipboard> {
    clock: C,
    clipboard: B,
    timeouts: RevealTimeouts,
    next_id: u64,
    active: Option<ActiveEntry>,
    input: PassphraseInput,
    last_close: Option<CloseReason>,
    clipboard_clear_at: Option<Instant>,
}

impl<C: Clock, B: Clipboard> RevealSession<C, B> {
    pub fn new(clock: C, clipboard: B) -> Self {
        Self::with_timeouts(clock, clipboard, RevealTimeouts::default())
    }

    pub fn with_timeouts(clock: C, clipboard: B, timeouts: RevealTimeouts) -> Self {
        Self {
            clock,
            clipboard,
            timeouts,
            next_id: 0,
            active: None,
            input: PassphraseInput::new(),
            last_close: None,
            clipboard_clear_at: None,
        }
    }

    pub fn state(&self) -> RevealState {
        match &self.active {
            None => RevealState::Closed,
            Some(entry) if entry.plaintext.is_some() => RevealState::Revealed,
            Some(_) => RevealState::AwaitingPassphrase,
        }
    }

    /// Open `name` for reveal, closing whatever was open before.
    pub fn open(&mut self, name: impl Into<String>, ciphertext: impl Into<String>) -> SessionId {
        if self.active.is_some() {
            self.finish(CloseReason::Replaced);
        }
        self.next_id += 1;
        let id = SessionId(self.next_id);
        let name = name.into();
        tracing::debug!(session = id.0, entry = %name, "Reveal session opened");
        self.active = Some(ActiveEntry {
            id,
            name,
            ciphertext: ciphertext.into(),
            plaintext: None,
            erase_at: None,
            error: None,
        });
        self.input.clear();
        self.last_close = None;
        id
    }

    /// The passphrase field.
    pub fn input_mut(&mut self) -> &mut PassphraseInput {
        &mut self.input
    }

    pub fn input(&self) -> &PassphraseInput {
        &self.input
    }

    /// Take the passphrase from the field and hand out a ticket for decryption.
    ///
    /// The field is cleared even when the call fails.
    ///
    /// # Errors
    ///
    /// Returns `PassviewError::InvalidState` unless awaiting a passphrase.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket> {
        let passphrase = self.input.take();
        let state = self.state();
        match self.active.as_mut() {
            Some(entry) if state == RevealState::AwaitingPassphrase => {
                entry.error = None;
                Ok(SubmitTicket {
                    session: entry.id,
                    ciphertext: entry.ciphertext.clone(),
                    passphrase,
                })
            }
            _ => Err(PassviewError::InvalidState(
                "No entry is waiting for a passphrase".to_string(),
            )),
        }
    }

    /// Apply the result of a ticket.
    pub fn complete_submit(&mut self, ticket: SubmitTicket, result: Result<Plaintext>) -> SubmitOutcome {
        let now = self.clock.now();
        let entry = match self.active.as_mut() {
            Some(entry) if entry.id == ticket.session && entry.plaintext.is_none() => entry,
            _ => {
                tracing::debug!(session = ticket.session.0, "Discarding stale reveal result");
                return SubmitOutcome::Discarded;
            }
        };

        match result {
            Ok(plaintext) => {
                entry.plaintext = Some(plaintext);
                entry.erase_at = Some(now + self.timeouts.erase_after);
                entry.error = None;
                tracing::debug!(session = entry.id.0, "Entry revealed");
                SubmitOutcome::Revealed
            }
            Err(err) => {
                let message = err.to_string();
                entry.error = Some(message.clone());
                SubmitOutcome::Rejected(message)
            }
        }
    }

    /// Submit the passphrase field: unlock `key`, decrypt the open entry.
    ///
    /// # Errors
    ///
    /// Returns `PassviewError::InvalidState` unless awaiting a passphrase.
    /// Decryption failures are not errors; they yield
    /// [`SubmitOutcome::Rejected`].
    pub fn submit<D: EntryDecryptor>(
        &mut self,
        decryptor: &D,
        key: &PrivateKeyMaterial,
    ) -> Result<SubmitOutcome> {
        let ticket = self.begin_submit()?;
        let result = ticket.run(decryptor, key);
        Ok(self.complete_submit(ticket, result))
    }

    /// Copy the first line to the clipboard and close.
    ///
    /// Returns whether the clipboard write succeeded; a failed write is
    /// logged, and the session closes either way.
    ///
    /// # Errors
    ///
    /// Returns `PassviewError::InvalidState` unless an entry is revealed.
    pub fn copy_and_close(&mut self) -> Result<bool> {
        let text = match self.active.as_ref().and_then(|e| e.plaintext.as_ref()) {
            Some(plaintext) => plaintext.first_line(),
            None => {
                return Err(PassviewError::InvalidState(
                    "No entry is revealed".to_string(),
                ))
            }
        };
        let copied = match self.clipboard.write_text(text) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Copy to clipboard failed");
                false
            }
        };
        self.finish(CloseReason::Copied);
        if copied {
            self.clipboard_clear_at = Some(self.clock.now() + self.timeouts.clipboard_clear_after);
        }
        Ok(copied)
    }

    /// Close the open entry, wiping any plaintext.
    ///
    /// # Errors
    ///
    /// Returns `PassviewError::InvalidState` if nothing is open.
    pub fn close(&mut self) -> Result<()> {
        if self.active.is_none() {
            return Err(PassviewError::InvalidState(
                "No reveal session is open".to_string(),
            ));
        }
        self.finish(CloseReason::Closed);
        Ok(())
    }

    /// Fire due timers.
    pub fn poll(&mut self) -> Vec<TimerEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        let expired = self
            .active
            .as_ref()
            .filter(|entry| entry.erase_at.is_some_and(|at| at <= now))
            .map(|entry| entry.id);
        if let Some(id) = expired {
            self.finish(CloseReason::Expired);
            events.push(TimerEvent::Erased(id));
        }

        if self.clipboard_clear_at.is_some_and(|at| at <= now) {
            self.clear_clipboard_now();
            events.push(TimerEvent::ClipboardCleared);
        }

        events
    }

    /// Overwrite the clipboard now if a clear is pending.
    pub fn clear_clipboard_now(&mut self) {
        if self.clipboard_clear_at.take().is_none() {
            return;
        }
        if let Err(err) = self.clipboard.write_text("") {
            tracing::debug!(error = %err, "Clipboard clear failed");
        }
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        let erase = self.erase_deadline();
        match (erase, self.clipboard_clear_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn erase_deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(|entry| entry.erase_at)
    }

    pub fn clipboard_clear_deadline(&self) -> Option<Instant> {
        self.clipboard_clear_at
    }

    /// Time left before the revealed entry is erased.
    pub fn remaining(&self) -> Option<Duration> {
        self.erase_deadline()
            .map(|at| at.saturating_duration_since(self.clock.now()))
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|entry| entry.id)
    }

    pub fn entry_name(&self) -> Option<&str> {
        self.active.as_ref().map(|entry| entry.name.as_str())
    }

    /// Inline error of the last failed attempt.
    pub fn error(&self) -> Option<&str> {
        self.active.as_ref().and_then(|entry| entry.error.as_deref())
    }

    pub fn plaintext(&self) -> Option<&Plaintext> {
        self.active.as_ref().and_then(|entry| entry.plaintext.as_ref())
    }

    pub fn last_close_reason(&self) -> Option<CloseReason> {
        self.last_close
    }

    /// Whether the last entry was erased by its deadline rather than closed.
    pub fn was_time_erased(&self) -> bool {
        self.last_close == Some(CloseReason::Expired)
    }

    pub fn clipboard(&self) -> &B {
        &self.clipboard
    }

    fn finish(&mut self, reason: CloseReason) {
        if let Some(entry) = self.active.take() {
            tracing::debug!(session = entry.id.0, ?reason, "Reveal session closed");
        }
        self.input.clear();
        self.last_close = Some(reason);
    }
}
