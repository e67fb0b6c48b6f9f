//! Companion - live Composer manifest cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use companion::cli::{commands, Cli, Commands};
use companion::config::{ConfigManager, Settings};
use companion::error::CompanionResult;
use console::style;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CompanionResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Config commands must work even when the file is invalid
    let command = match cli.command {
        Commands::Config(args) => {
            init_logging(cli.verbose, "text");
            return commands::config(args, &manager).await;
        }
        other => other,
    };

    let config = manager.load().await?;
    init_logging(cli.verbose, &config.general.log_format);
    debug!("Using configuration at {}", manager.path().display());

    let settings = Arc::new(Settings::new(config));

    match command {
        Commands::List(args) => commands::list(args, &settings).await,
        Commands::Deps(args) => commands::deps(args, &settings).await,
        Commands::Status(args) => commands::status(args, &settings).await,
        Commands::Tasks(args) => commands::tasks(args, &settings).await,
        Commands::Watch(args) => commands::watch(args, &settings, &manager).await,
        Commands::Config(args) => commands::config(args, &manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; logs go to stderr so stdout stays parseable
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("companion=warn"),
        1 => EnvFilter::new("companion=info"),
        _ => EnvFilter::new("companion=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
