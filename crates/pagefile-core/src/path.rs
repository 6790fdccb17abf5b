//! Page file identity: absolute path validation and case normalization.
//!
//! The case rule applied to page file names differs between platform
//! releases: older releases report and expect lowercase names, newer ones a
//! capitalized drive letter with a lowercase remainder. The rule is therefore
//! a configured [`PathCase`] policy that is resolved once into a [`CaseRule`]
//! before any declaration is parsed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Configured path normalization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathCase {
    /// Pick the rule from the platform release reported by the management layer.
    #[default]
    Auto,
    Capitalize,
    Lowercase,
}

impl PathCase {
    /// Resolve the policy into a concrete rule.
    ///
    /// `Auto` lowercases on releases strictly older than `legacy_below` and
    /// capitalizes otherwise, including when the release is unknown.
    pub fn resolve(self, release: Option<&PlatformRelease>, legacy_below: &PlatformRelease) -> CaseRule {
        match self {
            Self::Capitalize => CaseRule::Capitalize,
            Self::Lowercase => CaseRule::Lowercase,
            Self::Auto => match release {
                Some(release) if release < legacy_below => CaseRule::Lowercase,
                _ => CaseRule::Capitalize,
            },
        }
    }
}

impl fmt::Display for PathCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Capitalize => write!(f, "capitalize"),
            Self::Lowercase => write!(f, "lowercase"),
        }
    }
}

impl FromStr for PathCase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "capitalize" => Ok(Self::Capitalize),
            "lowercase" => Ok(Self::Lowercase),
            other => Err(CoreError::configuration(format!(
                "unknown path case policy '{other}', expected auto, capitalize or lowercase"
            ))),
        }
    }
}

/// A resolved case rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseRule {
    Capitalize,
    Lowercase,
}

impl CaseRule {
    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::Lowercase => value.to_lowercase(),
            Self::Capitalize => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Platform release as reported by the operating system, e.g. `10.0.19045`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformRelease {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
}

impl PlatformRelease {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
        }
    }

    pub fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }
}

impl FromStr for PlatformRelease {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::configuration(format!("invalid platform release '{s}'"));
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };
        let build = match parts.next() {
            Some(p) => Some(p.parse().map_err(|_| invalid())?),
            None => None,
        };
        Ok(Self {
            major,
            minor,
            build,
        })
    }
}

impl TryFrom<String> for PlatformRelease {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PlatformRelease> for String {
    fn from(value: PlatformRelease) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PlatformRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.build {
            Some(build) => write!(f, "{}.{}.{}", self.major, self.minor, build),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

/// Normalized absolute path identifying a page file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageFilePath(String);

impl PageFilePath {
    /// Validate a declared path and normalize it with `rule`.
    pub fn parse(raw: &str, rule: CaseRule) -> Result<Self> {
        if raw.is_empty() {
            return Err(CoreError::MissingPath);
        }
        let stripped = strip_rooted_drive(raw);
        if !is_drive_absolute(stripped) && !is_unc(stripped) {
            return Err(CoreError::validation(format!(
                "Invalid page file name. Must be an absolute path, got {raw}"
            )));
        }
        Ok(Self(rule.apply(stripped)))
    }

    /// Normalize a name reported by the management layer.
    ///
    /// Reported names are not validated; they only need to compare equal to
    /// declared paths under the same rule.
    pub fn from_observed(name: &str, rule: CaseRule) -> Self {
        Self(rule.apply(strip_rooted_drive(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageFilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageFilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_separator(c: u8) -> bool {
    c == b'\\' || c == b'/'
}

fn is_drive_absolute(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && is_separator(b[2])
}

fn is_unc(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() > 2 && is_separator(b[0]) && is_separator(b[1]) && !is_separator(b[2])
}

// `/C:/pagefile.sys` names the same file as `C:/pagefile.sys`.
fn strip_rooted_drive(s: &str) -> &str {
    let b = s.as_bytes();
    if !b.is_empty() && is_separator(b[0]) && is_drive_absolute(&s[1..]) {
        &s[1..]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_matches_ruby_style() {
        assert_eq!(CaseRule::Capitalize.apply("c:\\PageFile.SYS"), "C:\\pagefile.sys");
        assert_eq!(CaseRule::Capitalize.apply(""), "");
        assert_eq!(CaseRule::Lowercase.apply("D:\\PAGEFILE.SYS"), "d:\\pagefile.sys");
    }

    #[test]
    fn test_parse_drive_absolute_paths() {
        let p = PageFilePath::parse("c:\\pagefile.sys", CaseRule::Capitalize).unwrap();
        assert_eq!(p.as_str(), "C:\\pagefile.sys");

        let p = PageFilePath::parse("C:/pagefile.sys", CaseRule::Lowercase).unwrap();
        assert_eq!(p.as_str(), "c:/pagefile.sys");
    }

    #[test]
    fn test_parse_strips_leading_separator_before_drive() {
        let p = PageFilePath::parse("/C:/pagefile.sys", CaseRule::Capitalize).unwrap();
        assert_eq!(p.as_str(), "C:/pagefile.sys");
    }

    #[test]
    fn test_parse_unc_path() {
        let p = PageFilePath::parse("\\\\server\\share\\pagefile.sys", CaseRule::Lowercase).unwrap();
        assert_eq!(p.as_str(), "\\\\server\\share\\pagefile.sys");
    }

    #[test]
    fn test_parse_rejects_relative_paths() {
        for raw in ["pagefile.sys", "C:pagefile.sys", "\\pagefile.sys", "./pagefile.sys"] {
            let err = PageFilePath::parse(raw, CaseRule::Capitalize).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid page file name. Must be an absolute path, got {raw}")
            );
        }
    }

    #[test]
    fn test_parse_rejects_empty_path() {
        let err = PageFilePath::parse("", CaseRule::Capitalize).unwrap_err();
        assert!(matches!(err, CoreError::MissingPath));
    }

    #[test]
    fn test_observed_names_compare_under_same_rule() {
        let declared = PageFilePath::parse("c:\\PAGEFILE.sys", CaseRule::Capitalize).unwrap();
        let observed = PageFilePath::from_observed("C:\\pagefile.sys", CaseRule::Capitalize);
        assert_eq!(declared, observed);
    }

    #[test]
    fn test_release_parse_and_order() {
        let win7: PlatformRelease = "6.1.7601".parse().unwrap();
        let threshold: PlatformRelease = "6.2".parse().unwrap();
        let win10: PlatformRelease = "10.0.19045".parse().unwrap();
        assert!(win7 < threshold);
        assert!(win10 > threshold);
        assert!(PlatformRelease::new(6, 2).with_build(9200) > threshold);
        assert_eq!(win7.to_string(), "6.1.7601");
        assert!("six".parse::<PlatformRelease>().is_err());
    }

    #[test]
    fn test_path_case_resolution() {
        let threshold = PlatformRelease::new(6, 2);
        let old = PlatformRelease::new(6, 1);
        let new = PlatformRelease::new(10, 0);
        assert_eq!(PathCase::Auto.resolve(Some(&old), &threshold), CaseRule::Lowercase);
        assert_eq!(PathCase::Auto.resolve(Some(&new), &threshold), CaseRule::Capitalize);
        assert_eq!(PathCase::Auto.resolve(None, &threshold), CaseRule::Capitalize);
        assert_eq!(PathCase::Lowercase.resolve(Some(&new), &threshold), CaseRule::Lowercase);
        assert_eq!(PathCase::Capitalize.resolve(Some(&old), &threshold), CaseRule::Capitalize);
    }

    #[test]
    fn test_path_case_from_str() {
        assert_eq!("AUTO".parse::<PathCase>().unwrap(), PathCase::Auto);
        assert_eq!("lowercase".parse::<PathCase>().unwrap(), PathCase::Lowercase);
        assert!("upper".parse::<PathCase>().is_err());
    }
}
