use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use pagefile_core::{CaseRule, PathCase, PlatformRelease};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Which management binding to use
    #[serde(default)]
    pub backend: BackendConfig,
    /// Reconciliation behaviour
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Backend validation
        if self.backend.fixture.is_some() && self.backend.kind != BackendKind::Memory {
            return Err("backend.fixture requires backend.kind = \"memory\"".into());
        }
        if self
            .backend
            .powershell_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err("backend.powershell_path must not be empty".into());
        }
        // Provider validation
        if self.provider.benign_error_codes.contains(&0) {
            return Err("provider.benign_error_codes must not contain 0".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Management binding selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The live binding where the platform supports it.
    #[default]
    Auto,
    Cim,
    /// An in-memory machine, optionally seeded from a fixture.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cim => write!(f, "cim"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cim" => Ok(Self::Cim),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{other}', expected auto, cim or memory")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    /// Explicit PowerShell interpreter for the CIM binding
    #[serde(default)]
    pub powershell_path: Option<PathBuf>,
    /// JSON machine description for the memory binding
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub path_case: PathCase,
    /// Releases below this one keep lowercase paths under `path_case = "auto"`
    #[serde(default = "default_legacy_release_below")]
    pub legacy_release_below: PlatformRelease,
    /// Automation codes treated as success. Empty unless a machine is known
    /// to report one after a write that landed.
    #[serde(default)]
    pub benign_error_codes: Vec<u32>,
}
fn default_legacy_release_below() -> PlatformRelease {
    PlatformRelease::new(6, 2)
}
impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            path_case: PathCase::default(),
            legacy_release_below: default_legacy_release_below(),
            benign_error_codes: Vec::new(),
        }
    }
}

impl ProviderSettings {
    /// Case rule for a machine reporting `release`.
    pub fn case_rule(&self, release: Option<&PlatformRelease>) -> CaseRule {
        self.path_case.resolve(release, &self.legacy_release_below)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.backend.kind, BackendKind::Auto);
        assert!(cfg.provider.benign_error_codes.is_empty());
        assert_eq!(cfg.provider.legacy_release_below, PlatformRelease::new(6, 2));
    }

    #[test]
    fn test_fixture_requires_memory_backend() {
        let mut cfg = AppConfig::default();
        cfg.backend.fixture = Some(PathBuf::from("machine.json"));
        assert!(cfg.validate().unwrap_err().contains("backend.fixture"));
        cfg.backend.kind = BackendKind::Memory;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().unwrap_err().starts_with("logging.level"));
    }

    #[test]
    fn test_case_rule_follows_release() {
        let settings = ProviderSettings::default();
        let legacy = PlatformRelease::new(6, 1).with_build(7601);
        assert_eq!(settings.case_rule(Some(&legacy)), CaseRule::Lowercase);
        assert_eq!(settings.case_rule(Some(&PlatformRelease::new(10, 0))), CaseRule::Capitalize);
        assert_eq!(settings.case_rule(None), CaseRule::Capitalize);

        let forced = ProviderSettings {
            path_case: PathCase::Lowercase,
            ..ProviderSettings::default()
        };
        assert_eq!(forced.case_rule(None), CaseRule::Lowercase);
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("CIM".parse::<BackendKind>().unwrap(), BackendKind::Cim);
        assert!("wmi".parse::<BackendKind>().is_err());
    }
}
