//! Repository for `conversion_status_documents` and `avi_output_documents`.

use albmig_core::conversion::{NewAviOutput, NewConversionStatus};
use albmig_core::types::DbId;
use sqlx::PgPool;

use crate::models::conversion::{AviOutputRow, ConversionStatusRow};

const STATUS_COLUMNS: &str =
    "id, run_id, schema_version, status_sheet, pivot_sheet, irule_discovery, created_at";

const AVI_COLUMNS: &str = "id, run_id, schema_version, body, created_at";

/// Appends and reads converter documents. Append-only per run.
pub struct ConversionRepo;

impl ConversionRepo {
    pub async fn insert_status(
        pool: &PgPool,
        run_id: DbId,
        doc: &NewConversionStatus,
    ) -> Result<ConversionStatusRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversion_status_documents \
                 (run_id, schema_version, status_sheet, pivot_sheet, irule_discovery) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {STATUS_COLUMNS}"
        );
        sqlx::query_as::<_, ConversionStatusRow>(&query)
            .bind(run_id)
            .bind(doc.schema_version)
            .bind(&doc.status_sheet)
            .bind(&doc.pivot_sheet)
            .bind(&doc.irule_discovery)
            .fetch_one(pool)
            .await
    }

    /// Newest conversion status document of a run.
    pub async fn latest_status(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Option<ConversionStatusRow>, sqlx::Error> {
        let query = format!(
            "SELECT {STATUS_COLUMNS} FROM conversion_status_documents \
             WHERE run_id = $1 ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, ConversionStatusRow>(&query)
            .bind(run_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn insert_avi_output(
        pool: &PgPool,
        run_id: DbId,
        doc: &NewAviOutput,
    ) -> Result<AviOutputRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO avi_output_documents (run_id, schema_version, body) \
             VALUES ($1, $2, $3) \
             RETURNING {AVI_COLUMNS}"
        );
        sqlx::query_as::<_, AviOutputRow>(&query)
            .bind(run_id)
            .bind(doc.schema_version)
            .bind(&doc.body)
            .fetch_one(pool)
            .await
    }

    /// Newest Avi output document of a run.
    pub async fn latest_avi_output(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Option<AviOutputRow>, sqlx::Error> {
        let query = format!(
            "SELECT {AVI_COLUMNS} FROM avi_output_documents \
             WHERE run_id = $1 ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, AviOutputRow>(&query)
            .bind(run_id)
            .fetch_optional(pool)
            .await
    }
}
