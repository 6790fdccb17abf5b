//! # pagefile-cim
//!
//! Live management binding for Windows page file settings.
//!
//! Each operation runs one short script through Windows PowerShell using the
//! `Get-/New-/Set-/Remove-CimInstance` cmdlets against
//! `Win32_PageFileSetting`, `Win32_ComputerSystem` and
//! `Win32_OperatingSystem`. Scripts answer with a single-line JSON envelope
//! that [`runner::decode`] turns into a value or an
//! [`AutomationError`](pagefile_wmi::AutomationError) carrying the HRESULT.

mod binding;
pub mod runner;
pub mod script;

pub use binding::CimManagement;
pub use runner::{PowerShell, ScriptRunner, resolve_interpreter};
