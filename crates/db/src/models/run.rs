//! Migration run rows.

use albmig_core::migration::MigrationRun;
use albmig_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `migration_runs` table.
#[derive(Debug, Clone, FromRow)]
pub struct MigrationRunRow {
    pub id: DbId,
    pub label: String,
    pub created_at: Timestamp,
}

impl From<MigrationRunRow> for MigrationRun {
    fn from(row: MigrationRunRow) -> Self {
        Self {
            id: row.id,
            label: row.label,
            created_at: row.created_at,
        }
    }
}
