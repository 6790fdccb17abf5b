//! # pagefile-wmi
//!
//! Management automation abstraction for Windows page file settings.
//!
//! This crate defines the traits a binding to the platform's management layer
//! must implement, the data exchanged with it, and an in-memory binding. The
//! live binding lives in `pagefile-cim`.
//!
//! ## Overview
//!
//! - [`PageFileManagement`]: enumerate, spawn, put and delete
//!   `Win32_PageFileSetting` instances
//! - [`AutomaticManagement`]: the `Win32_ComputerSystem.AutomaticManagedPageFile` flag
//! - [`PlatformInfo`]: the operating system release
//!
//! ## Example
//!
//! ```ignore
//! use pagefile_wmi::{InMemoryManagement, PageFileManagement, PageFileSetting};
//!
//! let machine = InMemoryManagement::new()
//!     .with_page_file(PageFileSetting::new("C:\\pagefile.sys", 0, 0));
//! let settings = machine.query_page_files()?;
//! ```

mod error;
pub mod memory;
mod traits;
mod types;

pub use error::{AutomationError, AutomationResult, HResult, codes};
pub use memory::{FaultMode, InMemoryManagement, MemoryFixture};
pub use traits::{AutomaticManagement, ManagementBinding, PageFileManagement, PlatformInfo};
pub use types::{Mutation, Operation, PageFileSetting};

/// Type alias for a boxed management binding.
pub type DynBinding = Box<dyn ManagementBinding>;
