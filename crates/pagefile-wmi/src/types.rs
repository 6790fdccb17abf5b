//! Data types exchanged with a management binding.

use serde::{Deserialize, Serialize};

/// A `Win32_PageFileSetting` instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFileSetting {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    /// Initial size in megabytes; 0 when system managed.
    #[serde(rename = "InitialSize", alias = "initial_size", default)]
    pub initial_size: u32,
    /// Maximum size in megabytes; 0 when system managed.
    #[serde(rename = "MaximumSize", alias = "maximum_size", default)]
    pub maximum_size: u32,
}

impl PageFileSetting {
    pub fn new(name: impl Into<String>, initial_size: u32, maximum_size: u32) -> Self {
        Self {
            name: name.into(),
            initial_size,
            maximum_size,
        }
    }

    /// Page file names are compared the way the platform compares file names.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// An operation against the management binding, used for journaling and
/// fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    QueryPageFiles,
    SpawnPageFile,
    PutPageFile,
    DeletePageFile,
    GetAutomaticManaged,
    SetAutomaticManaged,
    PlatformRelease,
}

impl Operation {
    /// Name of the automation primitive behind this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryPageFiles => "ExecQuery(Win32_PageFileSetting)",
            Self::SpawnPageFile => "SpawnInstance_(Win32_PageFileSetting)",
            Self::PutPageFile => "Put_(Win32_PageFileSetting)",
            Self::DeletePageFile => "Delete_(Win32_PageFileSetting)",
            Self::GetAutomaticManaged => "Get(Win32_ComputerSystem.AutomaticManagedPageFile)",
            Self::SetAutomaticManaged => "Put_(Win32_ComputerSystem.AutomaticManagedPageFile)",
            Self::PlatformRelease => "Get(Win32_OperatingSystem.Version)",
        }
    }

    /// Whether the operation changes system state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SpawnPageFile | Self::PutPageFile | Self::DeletePageFile | Self::SetAutomaticManaged
        )
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed change to system state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetAutomaticManaged(bool),
    Spawn { name: String },
    Put(PageFileSetting),
    Delete { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_deserializes_wmi_field_names() {
        let setting: PageFileSetting =
            serde_json::from_str(r#"{"Name":"C:\\pagefile.sys","InitialSize":512,"MaximumSize":1024}"#).unwrap();
        assert_eq!(setting, PageFileSetting::new("C:\\pagefile.sys", 512, 1024));
    }

    #[test]
    fn test_setting_deserializes_snake_case_and_defaults() {
        let setting: PageFileSetting = serde_json::from_str(r#"{"name":"D:\\pagefile.sys"}"#).unwrap();
        assert_eq!(setting.initial_size, 0);
        assert_eq!(setting.maximum_size, 0);
    }

    #[test]
    fn test_name_comparison_ignores_case() {
        let setting = PageFileSetting::new("C:\\pagefile.sys", 0, 0);
        assert!(setting.has_name("c:\\PAGEFILE.SYS"));
        assert!(!setting.has_name("D:\\pagefile.sys"));
    }

    #[test]
    fn test_mutating_operations() {
        assert!(Operation::PutPageFile.is_mutation());
        assert!(Operation::SetAutomaticManaged.is_mutation());
        assert!(!Operation::QueryPageFiles.is_mutation());
        assert!(!Operation::GetAutomaticManaged.is_mutation());
    }
}
