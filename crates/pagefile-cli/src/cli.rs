use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pagefile_config::BackendKind;

#[derive(Parser)]
#[command(name = "pagefile")]
#[command(about = "Declare and reconcile Windows page file settings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./pagefile.toml, then the user config dir)
    #[arg(short, long, global = true, env = "PAGEFILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Management binding (overrides backend.kind)
    #[arg(short, long, global = true, env = "PAGEFILE_BACKEND")]
    pub backend: Option<BackendKind>,

    /// JSON machine description for the memory backend
    #[arg(long, global = true, env = "PAGEFILE_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Log level (overrides logging.level, RUST_LOG wins)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List page files configured on the system
    List,
    /// Check a manifest without touching the system
    Validate(ManifestArgs),
    /// Reconcile the system with a manifest
    Apply(ApplyArgs),
    /// Inspect the effective configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ManifestArgs {
    /// Manifest file with [[pagefile]] entries
    pub manifest: PathBuf,
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Manifest file with [[pagefile]] entries
    pub manifest: PathBuf,
    /// Report what would change without changing it
    #[arg(long)]
    pub noop: bool,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show,
}
