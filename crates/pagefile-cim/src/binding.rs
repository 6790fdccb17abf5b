use std::path::Path;

use pagefile_core::PlatformRelease;
use pagefile_wmi::{
    AutomaticManagement, AutomationError, AutomationResult, Operation, PageFileManagement, PageFileSetting,
    PlatformInfo,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::runner::{PowerShell, ScriptRunner, decode, resolve_interpreter};
use crate::script;

/// Management binding backed by the CIM cmdlets of Windows PowerShell.
#[derive(Debug, Clone)]
pub struct CimManagement<R = PowerShell> {
    runner: R,
}

impl CimManagement<PowerShell> {
    /// Resolve the interpreter and build the binding.
    ///
    /// Fails with [`AutomationError::Unsupported`] off Windows or when no
    /// interpreter can be found.
    pub fn connect(configured_interpreter: Option<&Path>) -> AutomationResult<Self> {
        if !cfg!(windows) {
            return Err(AutomationError::unsupported(
                "the CIM binding requires Windows; use the memory backend elsewhere",
            ));
        }
        let windows_dir = std::env::var_os("WINDIR").map(std::path::PathBuf::from);
        let executable = resolve_interpreter(configured_interpreter, windows_dir.as_deref(), Path::exists)?;
        debug!(interpreter = %executable.display(), "Resolved PowerShell interpreter");
        Ok(Self::with_runner(PowerShell::new(executable)))
    }
}

impl<R: ScriptRunner> CimManagement<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    #[cfg(test)]
    fn runner(&self) -> &R {
        &self.runner
    }

    fn call(&self, operation: Operation, script: String) -> AutomationResult<Value> {
        let operation = operation.as_str();
        let stdout = self.runner.run(operation, &script)?;
        decode(operation, &stdout)
    }

    fn call_as<T: DeserializeOwned>(&self, operation: Operation, script: String) -> AutomationResult<T> {
        let value = self.call(operation, script)?;
        serde_json::from_value(value)
            .map_err(|e| AutomationError::parse(format!("{}: {e}", operation.as_str())))
    }
}

impl<R: ScriptRunner> PageFileManagement for CimManagement<R> {
    fn name(&self) -> &str {
        "cim"
    }

    fn query_page_files(&self) -> AutomationResult<Vec<PageFileSetting>> {
        let value = self.call(Operation::QueryPageFiles, script::query_page_files())?;
        match value {
            Value::Null => Ok(Vec::new()),
            // a lone instance may come back unwrapped
            Value::Object(_) => serde_json::from_value(value)
                .map(|setting| vec![setting])
                .map_err(|e| AutomationError::parse(format!("{}: {e}", Operation::QueryPageFiles))),
            other => serde_json::from_value(other)
                .map_err(|e| AutomationError::parse(format!("{}: {e}", Operation::QueryPageFiles))),
        }
    }

    fn spawn_page_file(&self, name: &str) -> AutomationResult<()> {
        self.call(Operation::SpawnPageFile, script::spawn_page_file(name))
            .map(drop)
    }

    fn put_page_file(&self, setting: &PageFileSetting) -> AutomationResult<()> {
        self.call(Operation::PutPageFile, script::put_page_file(setting))
            .map(drop)
    }

    fn delete_page_file(&self, name: &str) -> AutomationResult<()> {
        self.call(Operation::DeletePageFile, script::delete_page_file(name))
            .map(drop)
    }
}

impl<R: ScriptRunner> AutomaticManagement for CimManagement<R> {
    fn automatic_managed_page_file(&self) -> AutomationResult<bool> {
        self.call_as(Operation::GetAutomaticManaged, script::automatic_managed())
    }

    fn set_automatic_managed_page_file(&self, enabled: bool) -> AutomationResult<()> {
        self.call(Operation::SetAutomaticManaged, script::set_automatic_managed(enabled))
            .map(drop)
    }
}

impl<R: ScriptRunner> PlatformInfo for CimManagement<R> {
    fn platform_release(&self) -> AutomationResult<Option<PlatformRelease>> {
        let version: Option<String> = self.call_as(Operation::PlatformRelease, script::platform_release())?;
        Ok(version.and_then(|v| v.parse().ok()))
    }
}
