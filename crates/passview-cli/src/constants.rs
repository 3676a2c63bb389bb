//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Entry or folder not found in the export.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Wrong private-key passphrase.
    pub const AUTH_FAILED: i32 = 5;

    /// No usable configuration (missing passphrase or base URL).
    pub const CONFIG_REQUIRED: i32 = 6;

    /// The export could not be fetched, decrypted or parsed.
    pub const LOAD_FAILED: i32 = 7;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    /// Config file override.
    pub const CONFIG: &str = "PASSVIEW_CONFIG";
    /// Export passphrase, overriding the stored one.
    pub const PASSPHRASE: &str = "PASSVIEW_PASSPHRASE";
    /// Private-key passphrase for non-interactive reveal.
    pub const KEY_PASSPHRASE: &str = "PASSVIEW_KEY_PASSPHRASE";
    /// Log filter directives.
    pub const LOG: &str = "PASSVIEW_LOG";
}

/// Log filter used when `PASSVIEW_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "passview=warn,passview_core=warn";

/// Name of the directory under the XDG config home.
pub const APP_DIR: &str = "passview";
