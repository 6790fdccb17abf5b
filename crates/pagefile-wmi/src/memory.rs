//! In-memory management binding.
//!
//! Models the page file settings, the automatic management flag and the
//! platform release of one machine. Every committed change is appended to a
//! journal so callers can assert exactly which mutations a reconciliation
//! pass performed. One-shot faults can be injected per operation, either
//! failing before the change lands or after it has been applied.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pagefile_core::PlatformRelease;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AutomationError, AutomationResult, codes};
use crate::traits::{AutomaticManagement, PageFileManagement, PlatformInfo};
use crate::types::{Mutation, Operation, PageFileSetting};

/// Serialized machine state used to seed an [`InMemoryManagement`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFixture {
    #[serde(default)]
    pub automatic_managed_page_file: bool,
    #[serde(default)]
    pub platform_release: Option<PlatformRelease>,
    #[serde(default)]
    pub page_files: Vec<PageFileSetting>,
}

/// When an injected fault is reported relative to the change it guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultMode {
    /// The call fails and nothing changes.
    BeforeWrite,
    /// The change is applied, then the call reports the error anyway.
    AfterWrite,
}

#[derive(Debug, Clone)]
struct Fault {
    operation: Operation,
    code: u32,
    mode: FaultMode,
}

#[derive(Debug, Default)]
struct MachineState {
    page_files: Vec<PageFileSetting>,
    automatic: bool,
    release: Option<PlatformRelease>,
    journal: Vec<Mutation>,
    calls: Vec<Operation>,
    faults: Vec<Fault>,
}

impl MachineState {
    // Returns the fault registered for `operation`, consuming it.
    fn take_fault(&mut self, operation: Operation) -> Option<Fault> {
        let index = self.faults.iter().position(|f| f.operation == operation)?;
        Some(self.faults.remove(index))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.page_files.iter().position(|p| p.has_name(name))
    }
}

/// In-memory management binding.
#[derive(Debug, Default)]
pub struct InMemoryManagement {
    state: Mutex<MachineState>,
}

impl InMemoryManagement {
    /// Creates an empty machine with automatic management disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a machine from a fixture.
    pub fn from_fixture(fixture: MemoryFixture) -> Self {
        Self {
            state: Mutex::new(MachineState {
                page_files: fixture.page_files,
                automatic: fixture.automatic_managed_page_file,
                release: fixture.platform_release,
                ..Default::default()
            }),
        }
    }

    /// Reads a JSON fixture from disk.
    pub fn from_fixture_file(path: impl AsRef<Path>) -> AutomationResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AutomationError::io(format!("read fixture {}", path.display()), e))?;
        let fixture: MemoryFixture = serde_json::from_str(&content)
            .map_err(|e| AutomationError::parse(format!("fixture {}: {e}", path.display())))?;
        debug!(path = %path.display(), page_files = fixture.page_files.len(), "Loaded memory fixture");
        Ok(Self::from_fixture(fixture))
    }

    pub fn with_page_file(self, setting: PageFileSetting) -> Self {
        self.lock().page_files.push(setting);
        self
    }

    pub fn with_automatic_managed(self, enabled: bool) -> Self {
        self.lock().automatic = enabled;
        self
    }

    pub fn with_release(self, release: PlatformRelease) -> Self {
        self.lock().release = Some(release);
        self
    }

    /// Registers a one-shot fault for the next call of `operation`.
    pub fn inject_fault(&self, operation: Operation, code: u32, mode: FaultMode) {
        self.lock().faults.push(Fault {
            operation,
            code,
            mode,
        });
    }

    /// Committed mutations, oldest first.
    pub fn journal(&self) -> Vec<Mutation> {
        self.lock().journal.clone()
    }

    /// Every call made against the binding, oldest first.
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    /// Number of calls that would have changed system state.
    pub fn mutating_calls(&self) -> usize {
        self.lock().calls.iter().filter(|op| op.is_mutation()).count()
    }

    pub fn clear_journal(&self) {
        let mut state = self.lock();
        state.journal.clear();
        state.calls.clear();
    }

    /// Current page file settings.
    pub fn page_files(&self) -> Vec<PageFileSetting> {
        self.lock().page_files.clone()
    }

    pub fn automatic_managed(&self) -> bool {
        self.lock().automatic
    }

    /// Snapshot of the machine as a fixture.
    #[cfg(test)]
    fn to_fixture(&self) -> MemoryFixture {
        let state = self.lock();
        MemoryFixture {
            automatic_managed_page_file: state.automatic,
            platform_release: state.release.clone(),
            page_files: state.page_files.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MachineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `apply` for `operation`, honouring any injected fault.
    fn run<T>(
        &self,
        operation: Operation,
        apply: impl FnOnce(&mut MachineState) -> AutomationResult<T>,
    ) -> AutomationResult<T> {
        let mut state = self.lock();
        state.calls.push(operation);
        match state.take_fault(operation) {
            Some(fault) if fault.mode == FaultMode::BeforeWrite => Err(injected(operation, fault.code)),
            Some(fault) => {
                apply(&mut *state)?;
                Err(injected(operation, fault.code))
            }
            None => apply(&mut *state),
        }
    }
}

fn injected(operation: Operation, code: u32) -> AutomationError {
    AutomationError::call(operation.as_str(), Some(code), "injected fault")
}

fn not_found(operation: Operation, name: &str) -> AutomationError {
    AutomationError::call(
        operation.as_str(),
        Some(codes::WBEM_E_NOT_FOUND),
        format!("Win32_PageFileSetting.Name=\"{name}\" not found"),
    )
}

impl PageFileManagement for InMemoryManagement {
    fn name(&self) -> &str {
        "memory"
    }

    fn query_page_files(&self) -> AutomationResult<Vec<PageFileSetting>> {
        self.run(Operation::QueryPageFiles, |state| Ok(state.page_files.clone()))
    }

    fn spawn_page_file(&self, name: &str) -> AutomationResult<()> {
        self.run(Operation::SpawnPageFile, |state| {
            if state.position(name).is_some() {
                return Err(AutomationError::call(
                    Operation::SpawnPageFile.as_str(),
                    Some(codes::WBEM_E_ALREADY_EXISTS),
                    format!("Win32_PageFileSetting.Name=\"{name}\" already exists"),
                ));
            }
            state.page_files.push(PageFileSetting::new(name, 0, 0));
            state.journal.push(Mutation::Spawn {
                name: name.to_string(),
            });
            Ok(())
        })
    }

    fn put_page_file(&self, setting: &PageFileSetting) -> AutomationResult<()> {
        self.run(Operation::PutPageFile, |state| {
            let index = state
                .position(&setting.name)
                .ok_or_else(|| not_found(Operation::PutPageFile, &setting.name))?;
            let existing = &mut state.page_files[index];
            existing.initial_size = setting.initial_size;
            existing.maximum_size = setting.maximum_size;
            state.journal.push(Mutation::Put(setting.clone()));
            Ok(())
        })
    }

    fn delete_page_file(&self, name: &str) -> AutomationResult<()> {
        self.run(Operation::DeletePageFile, |state| {
            let index = state
                .position(name)
                .ok_or_else(|| not_found(Operation::DeletePageFile, name))?;
            state.page_files.remove(index);
            state.journal.push(Mutation::Delete {
                name: name.to_string(),
            });
            Ok(())
        })
    }
}

impl AutomaticManagement for InMemoryManagement {
    fn automatic_managed_page_file(&self) -> AutomationResult<bool> {
        self.run(Operation::GetAutomaticManaged, |state| Ok(state.automatic))
    }

    fn set_automatic_managed_page_file(&self, enabled: bool) -> AutomationResult<()> {
        self.run(Operation::SetAutomaticManaged, |state| {
            state.automatic = enabled;
            state.journal.push(Mutation::SetAutomaticManaged(enabled));
            Ok(())
        })
    }
}

impl PlatformInfo for InMemoryManagement {
    fn platform_release(&self) -> AutomationResult<Option<PlatformRelease>> {
        self.run(Operation::PlatformRelease, |state| Ok(state.release.clone()))
    }
}
