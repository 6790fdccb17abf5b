//! Binding selection. One binding is chosen per run and never swapped.

use anyhow::{Context, Result, bail};
use pagefile_cim::CimManagement;
use pagefile_config::{BackendConfig, BackendKind, ProviderSettings};
use pagefile_core::CaseRule;
use pagefile_provider::ProviderOptions;
use pagefile_wmi::{DynBinding, InMemoryManagement, ManagementBinding, PageFileManagement, PlatformInfo};
use tracing::{debug, info};

pub fn connect(config: &BackendConfig) -> Result<DynBinding> {
    let binding: DynBinding = match config.kind {
        BackendKind::Memory => match &config.fixture {
            Some(path) => Box::new(
                InMemoryManagement::from_fixture_file(path)
                    .with_context(|| format!("Failed to load fixture {}", path.display()))?,
            ),
            None => Box::new(InMemoryManagement::new()),
        },
        BackendKind::Cim => Box::new(cim(config)?),
        BackendKind::Auto => {
            if !cfg!(windows) {
                bail!("No live page file binding on this platform; use --backend memory");
            }
            Box::new(cim(config)?)
        }
    };
    info!(binding = binding.name(), "Using management binding");
    Ok(binding)
}

fn cim(config: &BackendConfig) -> Result<CimManagement> {
    CimManagement::connect(config.powershell_path.as_deref()).context("Failed to start the CIM binding")
}

/// Resolve the path case rule for the connected machine.
pub fn provider_options(binding: &dyn ManagementBinding, settings: &ProviderSettings) -> Result<ProviderOptions> {
    let release = binding
        .platform_release()
        .context("Failed to read the platform release")?;
    let case_rule: CaseRule = settings.case_rule(release.as_ref());
    debug!(release = ?release, case_rule = ?case_rule, "Resolved path case");
    Ok(ProviderOptions {
        case_rule,
        benign_codes: settings.benign_error_codes.clone(),
    })
}
