//! Management binding traits.
//!
//! The provider never talks to the platform directly. It is handed a binding
//! that implements these traits, chosen once at startup.

use pagefile_core::PlatformRelease;

use crate::error::AutomationResult;
use crate::types::PageFileSetting;

/// Access to `Win32_PageFileSetting` instances.
///
/// # Example
///
/// ```ignore
/// use pagefile_wmi::{PageFileManagement, PageFileSetting};
///
/// fn grow(binding: &dyn PageFileManagement, name: &str) -> AutomationResult<()> {
///     binding.spawn_page_file(name)?;
///     binding.put_page_file(&PageFileSetting::new(name, 4096, 4096))
/// }
/// ```
pub trait PageFileManagement {
    /// Short name of the binding, used in logs.
    fn name(&self) -> &str;

    /// Enumerates every page file setting on the system.
    ///
    /// Each call re-queries the platform; results are never cached.
    fn query_page_files(&self) -> AutomationResult<Vec<PageFileSetting>>;

    /// Creates and commits a page file setting carrying only its name.
    ///
    /// The platform assigns zero sizes to the new instance.
    fn spawn_page_file(&self, name: &str) -> AutomationResult<()>;

    /// Writes the sizes of an existing page file setting and commits them.
    fn put_page_file(&self, setting: &PageFileSetting) -> AutomationResult<()>;

    /// Deletes the page file setting with the given name.
    fn delete_page_file(&self, name: &str) -> AutomationResult<()>;
}

/// The system-wide `Win32_ComputerSystem.AutomaticManagedPageFile` flag.
///
/// Explicit page file settings cannot be created while the system manages
/// page files automatically.
pub trait AutomaticManagement {
    fn automatic_managed_page_file(&self) -> AutomationResult<bool>;

    fn set_automatic_managed_page_file(&self, enabled: bool) -> AutomationResult<()>;
}

/// Platform identification.
pub trait PlatformInfo {
    /// Returns the operating system release, or `None` when it cannot be told.
    fn platform_release(&self) -> AutomationResult<Option<PlatformRelease>>;
}

/// A complete binding: page file settings, the automatic management flag and
/// platform identification.
pub trait ManagementBinding: PageFileManagement + AutomaticManagement + PlatformInfo {
    fn as_page_files(&self) -> &dyn PageFileManagement;

    fn as_automatic(&self) -> &dyn AutomaticManagement;
}

impl<T> ManagementBinding for T
where
    T: PageFileManagement + AutomaticManagement + PlatformInfo,
{
    fn as_page_files(&self) -> &dyn PageFileManagement {
        self
    }

    fn as_automatic(&self) -> &dyn AutomaticManagement {
        self
    }
}
