mod backend;
mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use pagefile_config::loader::load_config_with_default_path;
use pagefile_config::{AppConfig, BackendKind};
use pagefile_provider::PageFileProvider;

use cli::{Cli, Commands, ConfigCommands};
use output::print_error;

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();
    let cfg = effective_config(&cli)?;

    observability::init_tracing_with_level(&cfg.logging.level);
    tracing::debug!(backend = %cfg.backend.kind, "Configuration loaded");

    match &cli.command {
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => commands::config::show(&cfg, format)?,
        },
        Commands::Validate(args) => {
            // No machine is consulted, so `auto` path case cannot see the release.
            let rule = cfg.provider.case_rule(None);
            commands::validate::validate(&args.manifest, rule, format)?;
        }
        Commands::List => {
            let binding = backend::connect(&cfg.backend)?;
            let options = backend::provider_options(binding.as_ref(), &cfg.provider)?;
            let provider = PageFileProvider::new(binding.as_page_files(), options);
            commands::list::list(&provider, format)?;
        }
        Commands::Apply(args) => {
            let binding = backend::connect(&cfg.backend)?;
            let options = backend::provider_options(binding.as_ref(), &cfg.provider)?;
            let provider = PageFileProvider::new(binding.as_page_files(), options);
            commands::apply::apply(
                &provider,
                binding.as_automatic(),
                &args.manifest,
                args.noop,
                format,
            )?;
        }
    }

    Ok(())
}

/// Merge command line overrides into the loaded configuration.
fn effective_config(cli: &Cli) -> Result<AppConfig> {
    let mut cfg = load_config_with_default_path(cli.config.as_ref())
        .context("Failed to load configuration")?;
    if let Some(kind) = cli.backend {
        cfg.backend.kind = kind;
    }
    if let Some(fixture) = &cli.fixture {
        cfg.backend.fixture = Some(fixture.clone());
        if cli.backend.is_none() {
            cfg.backend.kind = BackendKind::Memory;
        }
    }
    if let Some(level) = &cli.log_level {
        cfg.logging.level = level.clone();
    }
    cfg.validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    Ok(cfg)
}
