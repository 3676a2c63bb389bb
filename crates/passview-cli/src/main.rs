//! Passview CLI - a read-only viewer for encrypted password-store exports
//!
//! This is the command-line interface for Passview. It loads the export,
//! lists and searches its entries, and reveals one entry at a time.

mod app;
mod cli;
mod clipboard;
mod commands;
mod config;
mod constants;
mod errors;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::constants::{env_vars, DEFAULT_LOG_FILTER};
use crate::errors::CliError;
use crate::ui::print_error;

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli).await {
        let ui_ctx = ctx.ui_context(false);
        match e.downcast_ref::<CliError>() {
            Some(cli_error) => {
                print_error(&ui_ctx, &cli_error.to_string(), cli_error.hint());
                std::process::exit(cli_error.exit_code());
            }
            None => {
                print_error(&ui_ctx, &format!("{:#}", e), None);
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(env_vars::LOG)
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Config(args)) => commands::config::handle_config(ctx, args).await,
        Some(Commands::List(args)) => commands::list::handle_list(ctx, args).await,
        Some(Commands::Show(args)) => commands::show::handle_show(ctx, args).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "passview", &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("Passview v{}", passview_core::VERSION);
            println!("\nRun `passview --help` for usage information.");
            Ok(())
        }
    }
}
