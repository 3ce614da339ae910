//! Aggregate migration progress for the dashboard.

use serde::{Deserialize, Serialize};

use crate::migration::MigrationStatus;

/// Per-status counts of the virtual services in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: i64,
    pub in_review: i64,
    pub completed: i64,
    pub skipped: i64,
}

impl StatusCounts {
    /// Add `n` virtual services with the given status.
    pub fn add(&mut self, status: MigrationStatus, n: i64) {
        match status {
            MigrationStatus::Pending => self.pending += n,
            MigrationStatus::InReview => self.in_review += n,
            MigrationStatus::Completed => self.completed += n,
            MigrationStatus::Skipped => self.skipped += n,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.in_review + self.completed + self.skipped
    }
}

/// Dashboard counts. Always derived, never stored.
///
/// `total_count == completed_count + incomplete_count + skipped_count`, where
/// incomplete means pending or in review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOverview {
    pub total_count: i64,
    pub completed_count: i64,
    pub incomplete_count: i64,
    pub skipped_count: i64,
}

impl From<StatusCounts> for MigrationOverview {
    fn from(counts: StatusCounts) -> Self {
        Self {
            total_count: counts.total(),
            completed_count: counts.completed,
            incomplete_count: counts.pending + counts.in_review,
            skipped_count: counts.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_totals_add_up() {
        let mut counts = StatusCounts::default();
        counts.add(MigrationStatus::Pending, 3);
        counts.add(MigrationStatus::InReview, 1);
        counts.add(MigrationStatus::Completed, 4);
        counts.add(MigrationStatus::Skipped, 2);

        let overview = MigrationOverview::from(counts);
        assert_eq!(overview.total_count, 10);
        assert_eq!(overview.incomplete_count, 4);
        assert_eq!(
            overview.total_count,
            overview.completed_count + overview.incomplete_count + overview.skipped_count
        );
    }

    #[test]
    fn overview_uses_camel_case_keys() {
        let json = serde_json::to_value(MigrationOverview::default()).unwrap();
        assert!(json.get("totalCount").is_some());
        assert!(json.get("incompleteCount").is_some());
    }
}
