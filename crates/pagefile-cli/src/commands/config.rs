use anyhow::Result;
use colored::Colorize;
use pagefile_config::AppConfig;

use crate::cli::OutputFormat;
use crate::output::print_json;

pub fn show(cfg: &AppConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(cfg)?,
        OutputFormat::Table => {
            println!("{}: {}", "Log level".cyan(), cfg.logging.level);
            println!("{}: {}", "Backend".cyan(), cfg.backend.kind);
            println!(
                "{}: {}",
                "PowerShell".cyan(),
                cfg.backend
                    .powershell_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(resolved from WINDIR)".into())
            );
            if let Some(fixture) = &cfg.backend.fixture {
                println!("{}: {}", "Fixture".cyan(), fixture.display());
            }
            println!("{}: {}", "Path case".cyan(), cfg.provider.path_case);
            println!(
                "{}: {}",
                "Legacy release below".cyan(),
                cfg.provider.legacy_release_below
            );
            let codes: Vec<String> = cfg
                .provider
                .benign_error_codes
                .iter()
                .map(|c| format!("0x{c:08X}"))
                .collect();
            println!("{}: {}", "Benign error codes".cyan(), codes.join(", "));
        }
    }
    Ok(())
}
