//! Provider error types.
//!
//! Every provider error is fatal for the single resource being reconciled
//! and never for the pass.

use pagefile_core::{CoreError, ErrorCategory, PageFilePath};
use pagefile_wmi::AutomationError;

use crate::provider::ResourceState;

/// Errors raised while reconciling one page file.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The declaration violates a rule checked before any system call.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The live setting the operation needs does not exist.
    #[error("Pagefile[{path}] was not found on the system")]
    NotFound {
        /// Path of the missing page file.
        path: PageFilePath,
    },

    /// The management layer reported a failure.
    #[error(transparent)]
    Automation(#[from] AutomationError),

    /// The operation is not valid in the resource's current state.
    #[error("Pagefile[{path}]: cannot {operation} while {state}")]
    InvalidState {
        /// Path of the resource.
        path: PageFilePath,
        /// The rejected operation.
        operation: &'static str,
        /// The state the resource was in.
        state: ResourceState,
    },
}

impl ProviderError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(path: &PageFilePath) -> Self {
        Self::NotFound { path: path.clone() }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(CoreError::validation(message))
    }

    /// Returns `true` if this error rejects the declaration itself.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the error category for reporting purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(err) => err.category(),
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Automation(_) => ErrorCategory::Automation,
            Self::InvalidState { .. } => ErrorCategory::Validation,
        }
    }
}

/// Type alias for a provider result.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use pagefile_core::CaseRule;

    use super::*;

    fn path() -> PageFilePath {
        PageFilePath::parse("C:\\pagefile.sys", CaseRule::Capitalize).unwrap()
    }

    #[test]
    fn test_categories() {
        assert_eq!(ProviderError::validation("x").category(), ErrorCategory::Validation);
        assert_eq!(ProviderError::not_found(&path()).category(), ErrorCategory::NotFound);
        let automation: ProviderError = AutomationError::call("Put_", Some(1), "x").into();
        assert_eq!(automation.category(), ErrorCategory::Automation);
        let size: ProviderError = CoreError::invalid_size("initial_size_mb", "x").into();
        assert_eq!(size.category(), ErrorCategory::Type);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ProviderError::not_found(&path()).to_string(),
            "Pagefile[C:\\pagefile.sys] was not found on the system"
        );
        let err = ProviderError::InvalidState {
            path: path(),
            operation: "stage properties",
            state: ResourceState::Absent,
        };
        assert_eq!(
            err.to_string(),
            "Pagefile[C:\\pagefile.sys]: cannot stage properties while absent"
        );
        assert!(ProviderError::validation("bad").is_validation());
    }
}
