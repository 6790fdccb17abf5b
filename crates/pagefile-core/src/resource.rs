use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::path::{CaseRule, PageFilePath};
use crate::values::{RawValue, coerce_flag, coerce_size_mb, invalid_choice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for Ensure {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            _ => Err(invalid_choice(&RawValue::from(s), &["present", "absent"])),
        }
    }
}

/// A page file declaration as authored, before validation.
///
/// Field names follow the manifest format; the camelCase and legacy
/// lowercase spellings are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFileDeclaration {
    #[serde(default, alias = "name", alias = "title")]
    pub path: Option<String>,
    #[serde(default)]
    pub ensure: Option<String>,
    #[serde(default, alias = "systemManaged", alias = "systemmanaged")]
    pub system_managed: Option<RawValue>,
    #[serde(default, alias = "initialSizeMB", alias = "initialsize")]
    pub initial_size_mb: Option<RawValue>,
    #[serde(default, alias = "maximumSizeMB", alias = "maximumsize")]
    pub maximum_size_mb: Option<RawValue>,
}

/// A validated, normalized page file declaration.
///
/// Unset optional properties were not declared and are left unmanaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFileResource {
    pub path: PageFilePath,
    pub ensure: Ensure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_managed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_size_mb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_size_mb: Option<u32>,
}

impl PageFileResource {
    pub fn new(path: PageFilePath) -> Self {
        Self {
            path,
            ensure: Ensure::Present,
            system_managed: None,
            initial_size_mb: None,
            maximum_size_mb: None,
        }
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    pub fn with_system_managed(mut self, system_managed: bool) -> Self {
        self.system_managed = Some(system_managed);
        self
    }

    pub fn with_initial_size(mut self, size_mb: u32) -> Self {
        self.initial_size_mb = Some(size_mb);
        self
    }

    pub fn with_maximum_size(mut self, size_mb: u32) -> Self {
        self.maximum_size_mb = Some(size_mb);
        self
    }

    /// Validate and normalize a declaration property by property.
    ///
    /// Cross-property rules are not checked here; they depend on which
    /// properties were declared and are enforced by the provider.
    pub fn from_declaration(decl: &PageFileDeclaration, rule: CaseRule) -> Result<Self> {
        let raw_path = decl.path.as_deref().ok_or(CoreError::MissingPath)?;
        let path = PageFilePath::parse(raw_path, rule)?;
        let ensure = match decl.ensure.as_deref() {
            Some(raw) => raw.parse()?,
            None => Ensure::default(),
        };
        let system_managed = decl.system_managed.as_ref().map(coerce_flag).transpose()?;
        let initial_size_mb = decl
            .initial_size_mb
            .as_ref()
            .map(|v| coerce_size_mb("initial_size_mb", v))
            .transpose()?;
        let maximum_size_mb = decl
            .maximum_size_mb
            .as_ref()
            .map(|v| coerce_size_mb("maximum_size_mb", v))
            .transpose()?;

        Ok(Self {
            path,
            ensure,
            system_managed,
            initial_size_mb,
            maximum_size_mb,
        })
    }

    /// Whether either explicit size was declared.
    pub fn declares_size(&self) -> bool {
        self.initial_size_mb.is_some() || self.maximum_size_mb.is_some()
    }

    pub fn wants_system_managed(&self) -> bool {
        self.system_managed == Some(true)
    }
}

/// Validate a list of declarations into an ordered set keyed by path.
///
/// Declaration order is kept; two declarations that normalize to the same
/// path are rejected.
pub fn declare_all(
    declarations: &[PageFileDeclaration],
    rule: CaseRule,
) -> Result<IndexMap<PageFilePath, PageFileResource>> {
    let mut declared = IndexMap::with_capacity(declarations.len());
    for decl in declarations {
        let resource = PageFileResource::from_declaration(decl, rule)?;
        if declared.contains_key(&resource.path) {
            return Err(CoreError::duplicate_declaration(resource.path.as_str()));
        }
        declared.insert(resource.path.clone(), resource);
    }
    Ok(declared)
}

/// A page file setting as observed on the live system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedPageFile {
    /// Name exactly as reported by the management layer.
    pub name: String,
    pub path: PageFilePath,
    pub initial_size_mb: u32,
    pub maximum_size_mb: u32,
}

impl ObservedPageFile {
    pub fn new(name: impl Into<String>, initial_size_mb: u32, maximum_size_mb: u32, rule: CaseRule) -> Self {
        let name = name.into();
        Self {
            path: PageFilePath::from_observed(&name, rule),
            name,
            initial_size_mb,
            maximum_size_mb,
        }
    }

    /// Observed instances always exist.
    pub fn ensure(&self) -> Ensure {
        Ensure::Present
    }

    /// System-managed page files report zero for both sizes.
    pub fn system_managed(&self) -> bool {
        self.initial_size_mb == 0 && self.maximum_size_mb == 0
    }
}
