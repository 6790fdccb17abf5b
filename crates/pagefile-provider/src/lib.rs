//! # pagefile-provider
//!
//! Reconciles declared page files against the live system through a
//! [`PageFileManagement`](pagefile_wmi::PageFileManagement) binding.
//!
//! ## Overview
//!
//! - [`PageFileProvider`]: enumerate, prefetch, create, destroy, stage and flush
//! - [`StagedChanges`]: property writes waiting for a flush
//! - [`reconcile`]: drive a whole set of declarations in one pass
//!
//! ## Example
//!
//! ```ignore
//! use pagefile_provider::{PageFileProvider, ProviderOptions, ReconcileOptions, reconcile};
//!
//! let provider = PageFileProvider::new(&binding, ProviderOptions::default());
//! let report = reconcile(&provider, &binding, declared.into_values(), ReconcileOptions::default())?;
//! ```

mod error;
mod notice;
mod provider;
pub mod reconcile;
mod staged;

pub use error::{ProviderError, ProviderResult};
pub use notice::Notice;
pub use provider::{
    Instances, PageFileProvider, ProviderOptions, ResourceHandle, ResourceState, validate_declaration,
};
pub use reconcile::{
    Action, PropertyChange, ReconcileOptions, ReconcileReport, ResourceOutcome, reconcile,
};
pub use staged::StagedChanges;
