//! Page file manifests.
//!
//! ```toml
//! [[pagefile]]
//! path = "C:\\pagefile.sys"
//! initial_size_mb = 512
//! maximum_size_mb = 1024
//!
//! [[pagefile]]
//! path = "D:\\pagefile.sys"
//! ensure = "absent"
//! ```

use std::path::Path;

use indexmap::IndexMap;
use pagefile_core::{CaseRule, PageFileDeclaration, PageFilePath, PageFileResource, declare_all};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, Result};

/// The declarations read from one manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "pagefile")]
    pub page_files: Vec<PageFileDeclaration>,
}

impl Manifest {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::parse(format!("manifest: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let manifest = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), declarations = manifest.page_files.len(), "Loaded manifest");
        Ok(manifest)
    }

    /// Validate every declaration and key it by normalized path, in file order.
    pub fn resources(&self, rule: CaseRule) -> Result<IndexMap<PageFilePath, PageFileResource>> {
        Ok(declare_all(&self.page_files, rule)?)
    }
}

#[cfg(test)]
mod tests {
    use pagefile_core::{CoreError, Ensure};

    use super::*;

    #[test]
    fn test_parses_native_and_string_values() {
        let manifest = Manifest::from_toml_str(
            r#"
[[pagefile]]
path = "c:\\pagefile.sys"
initial_size_mb = 512
maximum_size_mb = "1024"

[[pagefile]]
name = "D:\\pagefile.sys"
system_managed = "true"

[[pagefile]]
path = "E:\\pagefile.sys"
ensure = "absent"
"#,
        )
        .unwrap();
        let resources = manifest.resources(CaseRule::Capitalize).unwrap();
        let items: Vec<_> = resources.values().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].path.as_str(), "C:\\pagefile.sys");
        assert_eq!(items[0].initial_size_mb, Some(512));
        assert_eq!(items[0].maximum_size_mb, Some(1024));
        assert_eq!(items[1].system_managed, Some(true));
        assert_eq!(items[2].ensure, Ensure::Absent);
    }

    #[test]
    fn test_duplicate_paths_after_normalization() {
        let manifest = Manifest::from_toml_str(
            r#"
[[pagefile]]
path = "C:\\pagefile.sys"

[[pagefile]]
path = "/c:\\PAGEFILE.SYS"
"#,
        )
        .unwrap();
        let err = manifest.resources(CaseRule::Capitalize).unwrap_err();
        assert!(matches!(err, ConfigError::Manifest(CoreError::DuplicateDeclaration { .. })));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::from_toml_str("").unwrap();
        assert!(manifest.resources(CaseRule::Lowercase).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let manifest = Manifest::from_toml_str(
            r#"
[[pagefile]]
path = "C:\\pagefile.sys"
initial_size_mb = "big"
"#,
        )
        .unwrap();
        let err = manifest.resources(CaseRule::Capitalize).unwrap_err();
        assert!(err.to_string().contains("initial_size_mb"));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Manifest::from_toml_str("[[pagefile]\npath = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
