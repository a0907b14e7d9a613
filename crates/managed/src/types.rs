//! Core types for reconciliation

use crate::external::ExternalObservation;
use crate::record::ExternalName;
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a record stands relative to its external resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileState {
    /// No external name is bound; the resource was never created
    NoIdentity,
    /// Bound, but the external system no longer has the resource
    Absent,
    /// The resource exists and matches the desired state
    UpToDate,
    /// The resource exists but differs from the desired state
    Stale,
}

impl ReconcileState {
    /// Classify an observation
    pub fn from_observation(bound: bool, observation: &ExternalObservation) -> Self {
        if !bound {
            Self::NoIdentity
        } else if !observation.resource_exists {
            Self::Absent
        } else if observation.resource_up_to_date {
            Self::UpToDate
        } else {
            Self::Stale
        }
    }

    /// Check if the resource must be created
    pub fn needs_create(&self) -> bool {
        matches!(self, Self::NoIdentity | Self::Absent)
    }

    /// Check if the resource must be updated
    pub fn needs_update(&self) -> bool {
        matches!(self, Self::Stale)
    }

    /// Short lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoIdentity => "unbound",
            Self::Absent => "missing",
            Self::UpToDate => "in sync",
            Self::Stale => "drifted",
        }
    }
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a reconcile did to the external resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileAction {
    /// Nothing to do
    NoChange,
    /// The resource was created and bound
    Created { external_name: ExternalName },
    /// The resource was replaced with the desired state
    Updated,
    /// The resource was deleted
    Deleted,
    /// A change was needed but not made
    Skipped { reason: String },
}

impl ReconcileAction {
    /// Check if the action changed the external system
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Updated | Self::Deleted)
    }
}

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Record name
    pub name: String,
    /// Observed state, `None` for deletions
    pub state: Option<ReconcileState>,
    /// What was done about it
    pub action: ReconcileAction,
}

/// Readiness of the external resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadyReason {
    /// Create was issued; the resource is not observed yet
    Creating,
    /// The resource exists
    Available,
    /// The resource does not exist
    Unavailable,
    /// Delete was requested
    Deleting,
}

impl fmt::Display for ReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Creating => "Creating",
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
            Self::Deleting => "Deleting",
        };
        f.write_str(s)
    }
}

/// Outcome of the last reconcile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    /// The last reconcile completed
    Success,
    /// The last reconcile failed
    Error { message: String },
}

/// Status conditions written after every reconcile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<ReadyReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<SyncStatus>,
}

impl Conditions {
    /// Check if the last reconcile failed
    pub fn is_failing(&self) -> bool {
        matches!(self.synced, Some(SyncStatus::Error { .. }))
    }
}

/// Summary of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ReconcileSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// Check if every record reconciled without error
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of records processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Add an action to the summary
    pub fn add_action(&mut self, action: &ReconcileAction) {
        match action {
            ReconcileAction::NoChange => self.no_change += 1,
            ReconcileAction::Created { .. } => self.created += 1,
            ReconcileAction::Updated => self.updated += 1,
            ReconcileAction::Deleted => self.deleted += 1,
            ReconcileAction::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Add a per-record result to the summary
    pub fn add_result<E>(&mut self, result: &Result<ReconcileOutcome, E>) {
        match result {
            Ok(outcome) => self.add_action(&outcome.action),
            Err(_) => self.failed += 1,
        }
    }
}

/// Options for reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Observe only, report what would change
    pub dry_run: bool,
    /// Number of parallel jobs for batches
    pub jobs: usize,
    /// Retry policy for retryable failures
    pub retry: RetryConfig,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            retry: RetryConfig::default(),
        }
    }
}
