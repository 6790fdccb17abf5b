use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use pagefile_config::Manifest;
use pagefile_provider::{Action, PageFileProvider, ReconcileOptions, ReconcileReport, reconcile};
use pagefile_wmi::AutomaticManagement;

use crate::cli::OutputFormat;
use crate::output::{print_error, print_json, print_notice, print_success, print_table};

pub fn apply(
    provider: &PageFileProvider<'_>,
    automatic: &dyn AutomaticManagement,
    manifest_path: &Path,
    noop: bool,
    format: OutputFormat,
) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let resources = manifest
        .resources(provider.options().case_rule)
        .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;

    let report = reconcile(provider, automatic, resources.into_values(), ReconcileOptions { noop })
        .context("Reconciliation pass aborted")?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }

    let failed = report.failed();
    if failed > 0 {
        bail!("{failed} of {} page files failed to reconcile", report.outcomes.len());
    }
    Ok(())
}

fn print_report(report: &ReconcileReport) {
    if report.outcomes.is_empty() {
        println!("No page files declared.");
        return;
    }
    print_table(
        &["Path", "Action", "Changes", "Status"],
        report.outcomes.iter().map(|o| {
            let changes = o
                .changes
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            let status = match (&o.error, o.action) {
                (Some(_), _) => "failed".red().to_string(),
                (None, Action::InSync) => "in sync".to_string(),
                (None, _) if report.noop => "would change".yellow().to_string(),
                (None, _) => "changed".green().to_string(),
            };
            [o.path.to_string(), o.action.to_string(), changes, status]
        }),
    );

    for outcome in &report.outcomes {
        for notice in &outcome.notices {
            print_notice(&notice.to_string());
        }
        if let Some(err) = &outcome.error {
            print_error(err);
        }
    }

    let verb = if report.noop { "would change" } else { "changed" };
    let elapsed = report.finished_at - report.started_at;
    print_success(&format!(
        "{} of {} page files {verb} in {:.2}s",
        report.changed(),
        report.outcomes.len(),
        elapsed.as_seconds_f64()
    ));
}
