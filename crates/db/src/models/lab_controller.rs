//! Lab controller row.

use albmig_core::lab_controller::LabControllerDetails;
use albmig_core::types::Timestamp;
use sqlx::FromRow;

/// The singleton row of the `lab_controller_details` table.
#[derive(Debug, Clone, FromRow)]
pub struct LabControllerRow {
    pub host: String,
    pub username: String,
    pub credentials_ref: String,
    pub last_fetched_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl From<LabControllerRow> for LabControllerDetails {
    fn from(row: LabControllerRow) -> Self {
        Self {
            host: row.host,
            username: row.username,
            credentials_ref: row.credentials_ref,
            last_fetched_at: row.last_fetched_at,
            updated_at: row.updated_at,
        }
    }
}
