//! Virtual service migration rows.

use albmig_core::error::CoreError;
use albmig_core::migration::{MigrationStatus, VirtualServiceMigration};
use albmig_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `virtual_service_migrations` table.
#[derive(Debug, Clone, FromRow)]
pub struct VirtualServiceMigrationRow {
    pub id: DbId,
    pub run_id: DbId,
    pub name: String,
    pub f5_ref: String,
    pub avi_ref: Option<String>,
    pub vs_type: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<VirtualServiceMigrationRow> for VirtualServiceMigration {
    type Error = CoreError;

    fn try_from(row: VirtualServiceMigrationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            run_id: row.run_id,
            name: row.name,
            f5_ref: row.f5_ref,
            avi_ref: row.avi_ref,
            vs_type: row.vs_type,
            status: MigrationStatus::from_str_db(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a list of rows, failing on the first undecodable status.
pub fn into_domain(
    rows: Vec<VirtualServiceMigrationRow>,
) -> Result<Vec<VirtualServiceMigration>, sqlx::Error> {
    rows.into_iter()
        .map(|row| VirtualServiceMigration::try_from(row).map_err(super::decode_error))
        .collect()
}
