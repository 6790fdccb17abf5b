//! Reconciliation provider.
//!
//! Maps one declared page file onto the live `Win32_PageFileSetting`
//! instance with the same path. The provider holds no state between calls:
//! everything it learns about a resource lives in the [`ResourceHandle`] the
//! caller passes in, and property writes travel as [`StagedChanges`] values
//! from the setters to [`PageFileProvider::flush`].

use std::collections::HashMap;
use std::fmt;

use pagefile_core::{CaseRule, ObservedPageFile, PageFilePath, PageFileResource};
use pagefile_wmi::{AutomaticManagement, AutomationResult, PageFileManagement, PageFileSetting};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::notice::Notice;
use crate::staged::StagedChanges;

/// Lifecycle of one resource within a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Not yet matched against the live system.
    Unknown,
    Absent,
    PresentClean,
    /// Present with property changes staged but not flushed.
    PresentPendingFlush,
}

impl ResourceState {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::PresentClean | Self::PresentPendingFlush)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Absent => write!(f, "absent"),
            Self::PresentClean => write!(f, "present"),
            Self::PresentPendingFlush => write!(f, "present with unflushed changes"),
        }
    }
}

/// A declared resource together with what was observed for it.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    resource: PageFileResource,
    observed: Option<ObservedPageFile>,
    state: ResourceState,
}

impl ResourceHandle {
    /// A handle that has not been matched yet.
    pub fn new(resource: PageFileResource) -> Self {
        Self {
            resource,
            observed: None,
            state: ResourceState::Unknown,
        }
    }

    /// Bind the observed instance, or mark the resource absent.
    pub fn bind(&mut self, observed: Option<ObservedPageFile>) {
        self.state = if observed.is_some() {
            ResourceState::PresentClean
        } else {
            ResourceState::Absent
        };
        self.observed = observed;
    }

    pub fn resource(&self) -> &PageFileResource {
        &self.resource
    }

    pub fn path(&self) -> &PageFilePath {
        &self.resource.path
    }

    pub fn observed(&self) -> Option<&ObservedPageFile> {
        self.observed.as_ref()
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    /// True iff an observed instance was bound to this resource.
    pub fn exists(&self) -> bool {
        self.observed.is_some()
    }

    fn require_present(&self, operation: &'static str) -> ProviderResult<()> {
        if self.state.is_present() {
            Ok(())
        } else {
            Err(ProviderError::InvalidState {
                path: self.resource.path.clone(),
                operation,
                state: self.state,
            })
        }
    }
}

/// Options applied to every provider call.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Case rule shared by declared and observed paths.
    pub case_rule: CaseRule,
    /// Automation error codes reported even though the change was applied.
    pub benign_codes: Vec<u32>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            case_rule: CaseRule::Capitalize,
            benign_codes: Vec::new(),
        }
    }
}

/// Lazy view over one enumeration of the live page file settings.
pub struct Instances {
    settings: std::vec::IntoIter<PageFileSetting>,
    rule: CaseRule,
}

impl Iterator for Instances {
    type Item = ObservedPageFile;

    fn next(&mut self) -> Option<Self::Item> {
        self.settings
            .next()
            .map(|s| ObservedPageFile::new(s.name, s.initial_size, s.maximum_size, self.rule))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.settings.size_hint()
    }
}

/// Cross-property rules for a declared page file.
///
/// System-managed page files take no explicit sizes, and a page file that
/// is explicitly not system-managed needs at least one.
pub fn validate_declaration(resource: &PageFileResource) -> ProviderResult<()> {
    if resource.wants_system_managed() && resource.declares_size() {
        let declared: Vec<String> = [
            resource.initial_size_mb.map(|v| format!("initial_size_mb={v}")),
            resource.maximum_size_mb.map(|v| format!("maximum_size_mb={v}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        return Err(ProviderError::validation(format!(
            "Pagefile[{}]: initial_size_mb and maximum_size_mb should not be set when using system_managed (got {})",
            resource.path,
            declared.join(", ")
        )));
    }
    if resource.system_managed == Some(false) && !resource.declares_size() {
        return Err(ProviderError::validation(format!(
            "Pagefile[{}]: system_managed is false but neither initial_size_mb nor maximum_size_mb is set",
            resource.path
        )));
    }
    Ok(())
}

/// The reconciliation provider.
pub struct PageFileProvider<'a> {
    management: &'a dyn PageFileManagement,
    options: ProviderOptions,
}

impl<'a> PageFileProvider<'a> {
    pub fn new(management: &'a dyn PageFileManagement, options: ProviderOptions) -> Self {
        Self {
            management,
            options,
        }
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Enumerate every page file setting on the system.
    ///
    /// Each call re-queries the management layer.
    pub fn instances(&self) -> ProviderResult<Instances> {
        let settings = self.management.query_page_files()?;
        debug!(binding = self.management.name(), count = settings.len(), "Enumerated page files");
        Ok(Instances {
            settings: settings.into_iter(),
            rule: self.options.case_rule,
        })
    }

    /// Enumerate once and bind observed instances to declared resources by path.
    pub fn prefetch(
        &self,
        resources: impl IntoIterator<Item = PageFileResource>,
    ) -> ProviderResult<Vec<ResourceHandle>> {
        let mut observed: HashMap<PageFilePath, ObservedPageFile> =
            self.instances()?.map(|o| (o.path.clone(), o)).collect();
        Ok(resources
            .into_iter()
            .map(|resource| {
                let mut handle = ResourceHandle::new(resource);
                let matched = observed.remove(handle.path());
                handle.bind(matched);
                handle
            })
            .collect())
    }

    pub fn exists(&self, handle: &ResourceHandle) -> bool {
        handle.exists()
    }

    /// Check the rules that must hold before any system call is made.
    pub fn validate(&self, resource: &PageFileResource) -> ProviderResult<()> {
        validate_declaration(resource)
    }

    /// Create the page file.
    ///
    /// Identity is committed first, then the declared properties are staged
    /// and flushed against the new instance.
    pub fn create(
        &self,
        handle: &mut ResourceHandle,
        automatic: &dyn AutomaticManagement,
    ) -> ProviderResult<Vec<Notice>> {
        self.validate(handle.resource())?;
        let mut notices = Vec::new();

        if automatic.automatic_managed_page_file()? {
            self.tolerate(automatic.set_automatic_managed_page_file(false))?;
            notices.push(Notice::AutomaticManagementDisabled.emit());
        }

        let path = handle.path().clone();
        self.tolerate(self.management.spawn_page_file(path.as_str()))?;
        info!(path = %path, "Created page file setting");
        handle.bind(Some(ObservedPageFile::new(path.as_str(), 0, 0, self.options.case_rule)));

        let resource = handle.resource().clone();
        let mut staged = StagedChanges::new();
        if let Some(value) = resource.system_managed {
            staged = self.set_system_managed(handle, staged, value)?;
        }
        if let Some(value) = resource.initial_size_mb {
            staged = self.set_initial_size(handle, staged, value)?;
        }
        if let Some(value) = resource.maximum_size_mb {
            staged = self.set_maximum_size(handle, staged, value)?;
        }
        notices.extend(self.flush(handle, staged)?);
        Ok(notices)
    }

    /// Delete the page file, restoring automatic management when it was the last one.
    pub fn destroy(
        &self,
        handle: &mut ResourceHandle,
        automatic: &dyn AutomaticManagement,
    ) -> ProviderResult<Vec<Notice>> {
        let live = self.locate(handle.path())?;
        self.tolerate_at(&live.path, self.management.delete_page_file(&live.name))?;
        info!(path = %handle.path(), "Deleted page file setting");
        handle.bind(None);

        let mut notices = Vec::new();
        let remaining = self.management.query_page_files()?.len();
        if remaining == 0 && !automatic.automatic_managed_page_file()? {
            self.tolerate(automatic.set_automatic_managed_page_file(true))?;
            notices.push(Notice::AutomaticManagementEnabled.emit());
        }
        Ok(notices)
    }

    pub fn set_system_managed(
        &self,
        handle: &mut ResourceHandle,
        staged: StagedChanges,
        value: bool,
    ) -> ProviderResult<StagedChanges> {
        handle.require_present("stage properties")?;
        handle.state = ResourceState::PresentPendingFlush;
        Ok(staged.system_managed(value))
    }

    pub fn set_initial_size(
        &self,
        handle: &mut ResourceHandle,
        staged: StagedChanges,
        size_mb: u32,
    ) -> ProviderResult<StagedChanges> {
        handle.require_present("stage properties")?;
        handle.state = ResourceState::PresentPendingFlush;
        let maximum_declared = handle.resource.maximum_size_mb.is_some();
        Ok(staged.initial_size(size_mb, maximum_declared))
    }

    pub fn set_maximum_size(
        &self,
        handle: &mut ResourceHandle,
        staged: StagedChanges,
        size_mb: u32,
    ) -> ProviderResult<StagedChanges> {
        handle.require_present("stage properties")?;
        handle.state = ResourceState::PresentPendingFlush;
        let initial_declared = handle.resource.initial_size_mb.is_some();
        Ok(staged.maximum_size(size_mb, initial_declared))
    }

    /// Commit staged changes in one write.
    ///
    /// Nothing staged means no system call at all. Any write requires a
    /// restart before it applies, which is reported every time.
    pub fn flush(&self, handle: &mut ResourceHandle, staged: StagedChanges) -> ProviderResult<Vec<Notice>> {
        self.validate(handle.resource())?;
        if staged.is_empty() {
            if handle.state == ResourceState::PresentPendingFlush {
                handle.state = ResourceState::PresentClean;
            }
            return Ok(Vec::new());
        }

        let live = self.locate(handle.path())?;
        let resource = handle.resource();
        let (initial, maximum) = if staged.system_managed == Some(true) {
            (0, 0)
        } else {
            (
                staged
                    .initial_size_mb
                    .or(resource.initial_size_mb)
                    .unwrap_or(live.initial_size_mb),
                staged
                    .maximum_size_mb
                    .or(resource.maximum_size_mb)
                    .unwrap_or(live.maximum_size_mb),
            )
        };

        if resource.system_managed == Some(false) && initial == 0 && maximum == 0 {
            return Err(ProviderError::validation(format!(
                "Pagefile[{}]: zero sizes would make the page file system managed while system_managed is false",
                resource.path
            )));
        }

        let setting = PageFileSetting::new(live.name.clone(), initial, maximum);
        self.tolerate_at(&live.path, self.management.put_page_file(&setting))?;
        info!(path = %live.path, initial_size_mb = initial, maximum_size_mb = maximum, "Committed page file sizes");

        let path = live.path.clone();
        handle.observed = Some(ObservedPageFile {
            initial_size_mb: initial,
            maximum_size_mb: maximum,
            ..live
        });
        handle.state = ResourceState::PresentClean;
        Ok(vec![Notice::RebootRequired { path }.emit()])
    }

    fn locate(&self, path: &PageFilePath) -> ProviderResult<ObservedPageFile> {
        self.instances()?
            .find(|observed| &observed.path == path)
            .ok_or_else(|| ProviderError::not_found(path))
    }

    /// Swallow automation errors whose code is known to be benign.
    fn tolerate(&self, result: AutomationResult<()>) -> ProviderResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_benign(&self.options.benign_codes) => {
                debug!(error = %err, "Ignoring benign automation error");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Like [`tolerate`](Self::tolerate), but a live object that vanished
    /// after it was located surfaces as `NotFound` for `path`.
    fn tolerate_at(&self, path: &PageFilePath, result: AutomationResult<()>) -> ProviderResult<()> {
        match result {
            Err(err) if err.is_not_found() => Err(ProviderError::not_found(path)),
            other => self.tolerate(other),
        }
    }
}
