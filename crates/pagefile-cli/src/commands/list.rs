use anyhow::Result;
use pagefile_provider::PageFileProvider;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_table};

pub fn list(provider: &PageFileProvider<'_>, format: OutputFormat) -> Result<()> {
    let observed: Vec<_> = provider.instances()?.collect();

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = observed
                .iter()
                .map(|o| {
                    json!({
                        "path": o.path,
                        "name": o.name,
                        "ensure": o.ensure(),
                        "system_managed": o.system_managed(),
                        "initial_size_mb": o.initial_size_mb,
                        "maximum_size_mb": o.maximum_size_mb,
                    })
                })
                .collect();
            print_json(&items)?;
        }
        OutputFormat::Table => {
            if observed.is_empty() {
                println!("No page files configured.");
                return Ok(());
            }
            print_table(
                &["Path", "System managed", "Initial (MB)", "Maximum (MB)"],
                observed.iter().map(|o| {
                    [
                        o.path.to_string(),
                        o.system_managed().to_string(),
                        o.initial_size_mb.to_string(),
                        o.maximum_size_mb.to_string(),
                    ]
                }),
            );
        }
    }
    Ok(())
}
