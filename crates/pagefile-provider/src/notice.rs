use std::fmt;

use pagefile_core::PageFilePath;
use serde::Serialize;

/// Operator-facing notices raised while reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Automatic page file management was turned off so explicit settings can exist.
    AutomaticManagementDisabled,
    /// The last explicit setting was removed and automatic management restored.
    AutomaticManagementEnabled,
    /// New sizes were committed; they apply after a restart.
    RebootRequired { path: PageFilePath },
}

impl Notice {
    /// Log the notice and hand it back for reporting.
    pub(crate) fn emit(self) -> Self {
        tracing::info!(target: "pagefile::notice", "{self}");
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutomaticManagementDisabled => write!(
                f,
                "Automatic page file management disabled so page files can be configured explicitly"
            ),
            Self::AutomaticManagementEnabled => write!(
                f,
                "No page files remain configured; automatic page file management re-enabled"
            ),
            Self::RebootRequired { path } => write!(
                f,
                "Pagefile[{path}]: A reboot is required for the pagefile settings to take effect."
            ),
        }
    }
}
