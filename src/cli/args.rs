//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Companion - live Composer manifest cache
///
/// Reads composer.json in each workspace root and lists the scripts and
/// dependencies it declares, reloading as manifests change.
#[derive(Parser, Debug)]
#[command(name = "companion")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COMPANION_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the scripts of every loaded root
    List(ListArgs),

    /// Show the dependencies declared by a root
    Deps(DepsArgs),

    /// Show the load status of each root
    Status(StatusArgs),

    /// Show the command line each script runs with
    Tasks(TasksArgs),

    /// Keep watching roots and print the catalog on every change
    Watch(WatchArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Workspace roots (defaults to current directory)
    pub roots: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the deps command
#[derive(Parser, Debug)]
pub struct DepsArgs {
    /// Workspace root (defaults to current directory)
    pub root: Option<PathBuf>,

    /// Only show require-dev dependencies
    #[arg(long, conflicts_with = "no_dev")]
    pub dev: bool,

    /// Hide require-dev dependencies
    #[arg(long)]
    pub no_dev: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Workspace roots (defaults to current directory)
    pub roots: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the tasks command
#[derive(Parser, Debug)]
pub struct TasksArgs {
    /// Workspace roots (defaults to current directory)
    pub roots: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Workspace roots (defaults to current directory)
    pub roots: Vec<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., composer.enabled)
        key: String,
        /// Value to set
        value: String,
        /// Apply to one workspace root instead of globally
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
