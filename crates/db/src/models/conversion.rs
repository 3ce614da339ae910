//! Conversion status and Avi output document rows.

use albmig_core::conversion::{AviOutputDocument, ConversionStatusDocument};
use albmig_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `conversion_status_documents` table.
#[derive(Debug, Clone, FromRow)]
pub struct ConversionStatusRow {
    pub id: DbId,
    pub run_id: DbId,
    pub schema_version: i32,
    pub status_sheet: serde_json::Value,
    pub pivot_sheet: serde_json::Value,
    pub irule_discovery: serde_json::Value,
    pub created_at: Timestamp,
}

impl From<ConversionStatusRow> for ConversionStatusDocument {
    fn from(row: ConversionStatusRow) -> Self {
        Self {
            id: row.id,
            run_id: row.run_id,
            schema_version: row.schema_version,
            status_sheet: row.status_sheet,
            pivot_sheet: row.pivot_sheet,
            irule_discovery: row.irule_discovery,
            created_at: row.created_at,
        }
    }
}

/// A row from the `avi_output_documents` table.
#[derive(Debug, Clone, FromRow)]
pub struct AviOutputRow {
    pub id: DbId,
    pub run_id: DbId,
    pub schema_version: i32,
    pub body: serde_json::Value,
    pub created_at: Timestamp,
}

impl From<AviOutputRow> for AviOutputDocument {
    fn from(row: AviOutputRow) -> Self {
        Self {
            id: row.id,
            run_id: row.run_id,
            schema_version: row.schema_version,
            body: row.body,
            created_at: row.created_at,
        }
    }
}
