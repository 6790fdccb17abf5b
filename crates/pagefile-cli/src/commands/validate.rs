use std::path::Path;

use anyhow::{Context, Result, bail};
use pagefile_config::Manifest;
use pagefile_core::CaseRule;
use pagefile_provider::validate_declaration;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{print_error, print_json, print_success, print_table};

/// Check a manifest offline: per-property rules, duplicates and the
/// cross-property rules the provider enforces before any system call.
pub fn validate(manifest_path: &Path, rule: CaseRule, format: OutputFormat) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let resources = manifest
        .resources(rule)
        .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;

    let results: Vec<_> = resources
        .values()
        .map(|resource| (resource, validate_declaration(resource).err()))
        .collect();
    let failed = results.iter().filter(|(_, err)| err.is_some()).count();

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = results
                .iter()
                .map(|(resource, err)| {
                    json!({
                        "path": resource.path,
                        "ensure": resource.ensure,
                        "error": err.as_ref().map(|e| e.to_string()),
                    })
                })
                .collect();
            print_json(&items)?;
        }
        OutputFormat::Table => {
            if results.is_empty() {
                println!("No page files declared.");
            } else {
                print_table(
                    &["Path", "Ensure", "System managed", "Initial (MB)", "Maximum (MB)"],
                    results.iter().map(|(r, _)| {
                        [
                            r.path.to_string(),
                            r.ensure.to_string(),
                            optional(r.system_managed),
                            optional(r.initial_size_mb),
                            optional(r.maximum_size_mb),
                        ]
                    }),
                );
            }
            for err in results.iter().filter_map(|(_, err)| err.as_ref()) {
                print_error(&err.to_string());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} declarations are invalid", results.len());
    }
    if matches!(format, OutputFormat::Table) {
        print_success(&format!("{} declarations are valid", results.len()));
    }
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
