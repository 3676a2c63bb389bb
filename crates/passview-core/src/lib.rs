//! # Passview Core
//!
//! Core library for Passview - a read-only viewer for encrypted password-store
//! exports.
//!
//! This crate provides the data and security pipeline independent of any
//! user interface.
//!
//! ## Architecture
//!
//! - **locator**: Fetch URL and auth token derivation from the export passphrase
//! - **tree**: Flat path map to folder tree conversion, and query visibility
//! - **reveal**: On-demand entry decryption with timed erasure
//! - **loader**: Load pipeline and application state machine
//! - **crypto**: Decryption capabilities (age backend) and digests
//! - **transport**: HTTP fetching of the export blob
//!
//! ## Security Model
//!
//! - Secrets (passphrases, key material, plaintext) are zeroized on drop
//! - Only one decrypted entry is held in memory at a time
//! - Revealed plaintext and clipboard copies expire after a fixed window
//!
//! Memory zeroization is best-effort: copies made by the OS, the terminal or
//! the clipboard manager are outside our control.

pub mod clipboard;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod loader;
pub mod locator;
pub mod reveal;
pub mod secret;
pub mod transport;
pub mod tree;

pub use error::{PassviewError, Result};
pub use loader::{AppState, ConfigStore, DataConfig, LoadedExport, Orchestrator};
pub use locator::{locate, Location};
pub use reveal::{RevealSession, RevealState};
pub use tree::{compute_visibility, Folder, Node, TreeBuilder, Visibility};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
