use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use passview_core::VERSION;

use crate::constants::env_vars;

/// Passview - a read-only viewer for encrypted password-store exports
#[derive(Parser)]
#[command(name = "passview")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = env_vars::CONFIG)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the export passphrase and location, then load the export
    Config(ConfigArgs),

    /// List entries, optionally filtered by a search query
    List(ListArgs),

    /// Reveal one entry
    Show(ShowArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `config` command
#[derive(Args)]
pub struct ConfigArgs {
    /// Explicit export URL (disables derived location)
    #[arg(long, value_name = "URL", conflicts_with = "clear_url")]
    pub url: Option<String>,

    /// Remove the explicit export URL
    #[arg(long)]
    pub clear_url: bool,

    /// Base URL for the derived export location
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Print the current configuration and exit
    #[arg(long)]
    pub show: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive search over entry paths
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Expand every folder
    #[arg(long)]
    pub expand: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Entry path (e.g. web/github)
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Copy the first line to the clipboard instead of printing
    #[arg(long)]
    pub copy: bool,
}
