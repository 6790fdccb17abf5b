//! Staged property changes.
//!
//! Setters never touch the live system. Each one returns a new
//! [`StagedChanges`] value which is consumed by a single flush.

use serde::Serialize;

/// Property values waiting for the next flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[must_use = "staged changes are only written by a flush"]
pub struct StagedChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_managed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_size_mb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_size_mb: Option<u32>,
}

impl StagedChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the system-managed flag.
    ///
    /// `true` also stages zero for both sizes so one flush cannot leave sizes
    /// that contradict system-managed mode.
    pub fn system_managed(mut self, value: bool) -> Self {
        self.system_managed = Some(value);
        if value {
            self.initial_size_mb = Some(0);
            self.maximum_size_mb = Some(0);
        }
        self
    }

    /// Stage the initial size, mirroring it into the maximum size when the
    /// maximum was not declared.
    pub fn initial_size(mut self, size_mb: u32, maximum_declared: bool) -> Self {
        self.initial_size_mb = Some(size_mb);
        if !maximum_declared {
            self.maximum_size_mb = Some(size_mb);
        }
        self
    }

    /// Stage the maximum size, mirroring it into the initial size when the
    /// initial size was not declared.
    pub fn maximum_size(mut self, size_mb: u32, initial_declared: bool) -> Self {
        self.maximum_size_mb = Some(size_mb);
        if !initial_declared {
            self.initial_size_mb = Some(size_mb);
        }
        self
    }

    /// Whether nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.system_managed.is_none() && self.initial_size_mb.is_none() && self.maximum_size_mb.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        assert!(StagedChanges::new().is_empty());
    }

    #[test]
    fn test_system_managed_true_zeroes_sizes() {
        let staged = StagedChanges::new().initial_size(512, true).system_managed(true);
        assert_eq!(staged.system_managed, Some(true));
        assert_eq!(staged.initial_size_mb, Some(0));
        assert_eq!(staged.maximum_size_mb, Some(0));
    }

    #[test]
    fn test_system_managed_false_leaves_sizes() {
        let staged = StagedChanges::new().system_managed(false);
        assert_eq!(staged.system_managed, Some(false));
        assert_eq!(staged.initial_size_mb, None);
        assert!(!staged.is_empty());
    }

    #[test]
    fn test_initial_size_mirrors_undeclared_maximum() {
        let staged = StagedChanges::new().initial_size(512, false);
        assert_eq!(staged.maximum_size_mb, Some(512));

        let staged = StagedChanges::new().initial_size(512, true);
        assert_eq!(staged.maximum_size_mb, None);
    }

    #[test]
    fn test_maximum_size_mirrors_undeclared_initial() {
        let staged = StagedChanges::new().maximum_size(2048, false);
        assert_eq!(staged.initial_size_mb, Some(2048));
    }

    #[test]
    fn test_both_declared_keep_their_own_values() {
        let staged = StagedChanges::new().initial_size(512, true).maximum_size(1024, true);
        assert_eq!(staged.initial_size_mb, Some(512));
        assert_eq!(staged.maximum_size_mb, Some(1024));
    }
}
