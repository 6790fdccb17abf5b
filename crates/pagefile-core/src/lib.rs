//! # pagefile-core
//!
//! Declarable shape of a page file resource and the per-property validation
//! and normalization applied to it. Nothing here talks to the live system.

pub mod error;
pub mod path;
pub mod resource;
pub mod values;

pub use error::{CoreError, ErrorCategory, Result};
pub use path::{CaseRule, PageFilePath, PathCase, PlatformRelease};
pub use resource::{Ensure, ObservedPageFile, PageFileDeclaration, PageFileResource, declare_all};
pub use values::{RawValue, coerce_flag, coerce_size_mb};
