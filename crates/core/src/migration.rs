//! Virtual service migration status, transitions, and worklist types.
//!
//! A virtual service is the unit of migration. Each one is created when a
//! discovery import (or a live controller pull) runs and afterwards only moves
//! between statuses; it is never deleted.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Migration status
// ---------------------------------------------------------------------------

/// Review status of a single virtual service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    Pending,
    InReview,
    Completed,
    Skipped,
}

/// Every status, in display order.
pub const ALL_STATUSES: [MigrationStatus; 4] = [
    MigrationStatus::Pending,
    MigrationStatus::InReview,
    MigrationStatus::Completed,
    MigrationStatus::Skipped,
];

impl MigrationStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_review" => Ok(Self::InReview),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            _ => Err(CoreError::Validation(format!(
                "Invalid migration status '{s}'. Must be one of: pending, in_review, completed, skipped"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }

    /// Whether this virtual service still belongs on the review worklist.
    pub fn is_incomplete(self) -> bool {
        self != Self::Completed
    }

    /// Check a transition from `self` to `next`.
    ///
    /// Reapplying the current status is [`Transition::Unchanged`]. A
    /// completed virtual service cannot move anywhere else.
    pub fn transition_to(self, next: MigrationStatus) -> Result<Transition, CoreError> {
        if self == next {
            return Ok(Transition::Unchanged);
        }
        if self == Self::Completed {
            return Err(CoreError::Conflict(format!(
                "Virtual service migration is already completed; cannot move it to '{}'",
                next.as_str()
            )));
        }
        Ok(Transition::Applied)
    }
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`MigrationStatus::transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status changes.
    Applied,
    /// The target equals the current status; nothing to persist.
    Unchanged,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// One discovery import. The most recent run is the one the wizard works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRun {
    pub id: DbId,
    pub label: String,
    pub created_at: Timestamp,
}

/// A virtual service and where it stands in the migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceMigration {
    pub id: DbId,
    pub run_id: DbId,
    pub name: String,
    /// F5 full path, e.g. `/Common/vs_web_443`.
    pub f5_ref: String,
    /// Name of the Avi virtual service produced for it, once accepted.
    pub avi_ref: Option<String>,
    /// F5 virtual server flavour (`standard`, `forwarding-ip`, ...).
    pub vs_type: Option<String>,
    pub status: MigrationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Snapshot of the review worklist for the current run.
///
/// `items` holds every virtual service that is not completed, in import
/// order. `completed_count` counts the completed ones of the same run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteMigrationsBatch {
    pub run_id: Option<DbId>,
    pub items: Vec<VirtualServiceMigration>,
    pub completed_count: i64,
}

impl IncompleteMigrationsBatch {
    /// Build a batch from every virtual service of a run, in import order.
    pub fn from_run(run_id: Option<DbId>, all: Vec<VirtualServiceMigration>) -> Self {
        let (completed, items): (Vec<_>, Vec<_>) = all
            .into_iter()
            .partition(|vs| vs.status == MigrationStatus::Completed);
        Self {
            run_id,
            items,
            completed_count: completed.len() as i64,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// A virtual service found by discovery or by a live controller pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredVirtualService {
    pub name: String,
    pub f5_ref: String,
    #[serde(default)]
    pub vs_type: Option<String>,
}

/// Body of `POST /accept-configuration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptConfiguration {
    pub id: DbId,
    #[serde(default)]
    pub avi_ref: Option<String>,
}

/// Body of `POST /skip-migration` and `POST /start-migration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRef {
    pub id: DbId,
}

/// Result of merging discovered virtual services into a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub inserted: usize,
    pub unchanged: usize,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate one discovered virtual service.
///
/// F5 references are full paths (`/Partition/name`).
pub fn validate_discovered(vs: &DiscoveredVirtualService) -> Result<(), CoreError> {
    if vs.name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Virtual service name must not be empty".to_string(),
        ));
    }
    if !vs.f5_ref.starts_with('/') || vs.f5_ref.len() < 2 {
        return Err(CoreError::Validation(format!(
            "F5 reference '{}' must be a full path such as /Common/{}",
            vs.f5_ref, vs.name
        )));
    }
    Ok(())
}

/// Validate a discovery import: every entry valid, no duplicate F5 paths.
pub fn validate_import(items: &[DiscoveredVirtualService]) -> Result<(), CoreError> {
    let mut seen = std::collections::HashSet::new();
    for vs in items {
        validate_discovered(vs)?;
        if !seen.insert(vs.f5_ref.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate F5 reference '{}' in import",
                vs.f5_ref
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
