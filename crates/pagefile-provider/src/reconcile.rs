//! One reconciliation pass over a set of declared page files.
//!
//! The pass enumerates the live system once, then drives each resource
//! through exists, create or destroy, the property setters and a single
//! flush. A failure is recorded against the resource it belongs to and the
//! pass moves on; only a failed enumeration aborts the whole pass.

use std::fmt;

use pagefile_core::{Ensure, ErrorCategory, ObservedPageFile, PageFilePath, PageFileResource};
use pagefile_wmi::AutomaticManagement;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::notice::Notice;
use crate::provider::{PageFileProvider, ResourceHandle};
use crate::staged::StagedChanges;

/// Options for a reconciliation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Report what would change without touching the system.
    pub noop: bool,
}

/// What the pass did, or would do, for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    InSync,
    Create,
    Destroy,
    Update,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InSync => write!(f, "in sync"),
            Self::Create => write!(f, "create"),
            Self::Destroy => write!(f, "destroy"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// A single property that differs from the live value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyChange {
    pub property: &'static str,
    pub from: Value,
    pub to: Value,
}

impl PropertyChange {
    fn new(property: &'static str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self {
            property,
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for PropertyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} changed {} to {}", self.property, self.from, self.to)
    }
}

/// Result of reconciling one resource.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceOutcome {
    pub path: PageFilePath,
    pub action: Action,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<PropertyChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

impl ResourceOutcome {
    fn new(path: PageFilePath, action: Action) -> Self {
        Self {
            path,
            action,
            changes: Vec::new(),
            notices: Vec::new(),
            error: None,
            category: None,
        }
    }

    fn fail(&mut self, err: &ProviderError) {
        warn!(path = %self.path, action = %self.action, error = %err, "Failed to reconcile page file");
        self.error = Some(err.to_string());
        self.category = Some(err.category());
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary of a whole pass.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub noop: bool,
    pub outcomes: Vec<ResourceOutcome>,
}

impl ReconcileReport {
    /// Number of resources that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Number of resources that were, or would be, changed.
    pub fn changed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.is_failed() && o.action != Action::InSync)
            .count()
    }
}

/// Reconcile every declared resource against the live system.
pub fn reconcile(
    provider: &PageFileProvider<'_>,
    automatic: &dyn AutomaticManagement,
    declared: impl IntoIterator<Item = PageFileResource>,
    options: ReconcileOptions,
) -> ProviderResult<ReconcileReport> {
    let started_at = OffsetDateTime::now_utc();
    let handles = provider.prefetch(declared)?;
    info!(resources = handles.len(), noop = options.noop, "Starting reconciliation pass");

    let outcomes = handles
        .into_iter()
        .map(|mut handle| reconcile_one(provider, automatic, &mut handle, options))
        .collect::<Vec<_>>();

    let report = ReconcileReport {
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        noop: options.noop,
        outcomes,
    };
    info!(
        changed = report.changed(),
        failed = report.failed(),
        "Finished reconciliation pass"
    );
    Ok(report)
}

fn reconcile_one(
    provider: &PageFileProvider<'_>,
    automatic: &dyn AutomaticManagement,
    handle: &mut ResourceHandle,
    options: ReconcileOptions,
) -> ResourceOutcome {
    let resource = handle.resource().clone();
    let exists = provider.exists(handle);

    let action = match (resource.ensure, exists) {
        (Ensure::Absent, true) => Action::Destroy,
        (Ensure::Absent, false) => Action::InSync,
        (Ensure::Present, false) => Action::Create,
        (Ensure::Present, true) => Action::Update,
    };
    let mut outcome = ResourceOutcome::new(resource.path.clone(), action);

    let result = match action {
        Action::InSync => Ok(Vec::new()),
        Action::Destroy => {
            outcome.changes.push(PropertyChange::new("ensure", "present", "absent"));
            if options.noop {
                Ok(Vec::new())
            } else {
                provider.destroy(handle, automatic)
            }
        }
        Action::Create => {
            outcome.changes.push(PropertyChange::new("ensure", "absent", "present"));
            match provider.validate(&resource) {
                Err(err) => Err(err),
                Ok(()) if options.noop => Ok(Vec::new()),
                Ok(()) => provider.create(handle, automatic),
            }
        }
        Action::Update => update(provider, handle, &mut outcome, options),
    };

    match result {
        Ok(notices) => outcome.notices = notices,
        Err(err) => outcome.fail(&err),
    }
    if outcome.action == Action::Update && outcome.changes.is_empty() && !outcome.is_failed() {
        outcome.action = Action::InSync;
    }
    outcome
}

/// Stage every declared property that differs from the live value, then flush once.
fn update(
    provider: &PageFileProvider<'_>,
    handle: &mut ResourceHandle,
    outcome: &mut ResourceOutcome,
    options: ReconcileOptions,
) -> ProviderResult<Vec<Notice>> {
    let resource = handle.resource().clone();
    provider.validate(&resource)?;
    let Some(observed) = handle.observed().cloned() else {
        return Err(ProviderError::not_found(&resource.path));
    };
    outcome.changes = drift(&resource, &observed);
    if options.noop || outcome.changes.is_empty() {
        return Ok(Vec::new());
    }

    let mut staged = StagedChanges::new();
    if let Some(value) = resource.system_managed.filter(|v| *v != observed.system_managed()) {
        staged = provider.set_system_managed(handle, staged, value)?;
    }
    if let Some(value) = resource.initial_size_mb.filter(|v| *v != observed.initial_size_mb) {
        staged = provider.set_initial_size(handle, staged, value)?;
    }
    if let Some(value) = resource.maximum_size_mb.filter(|v| *v != observed.maximum_size_mb) {
        staged = provider.set_maximum_size(handle, staged, value)?;
    }
    provider.flush(handle, staged)
}

/// Declared properties whose value differs from what was observed.
fn drift(resource: &PageFileResource, observed: &ObservedPageFile) -> Vec<PropertyChange> {
    let mut changes = Vec::new();
    if let Some(value) = resource.system_managed {
        if value != observed.system_managed() {
            changes.push(PropertyChange::new("system_managed", observed.system_managed(), value));
        }
    }
    if let Some(value) = resource.initial_size_mb {
        if value != observed.initial_size_mb {
            changes.push(PropertyChange::new("initial_size_mb", observed.initial_size_mb, value));
        }
    }
    if let Some(value) = resource.maximum_size_mb {
        if value != observed.maximum_size_mb {
            changes.push(PropertyChange::new("maximum_size_mb", observed.maximum_size_mb, value));
        }
    }
    changes
}
