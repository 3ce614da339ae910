//! Repository for the singleton `lab_controller_details` table.

use albmig_core::lab_controller::SetLabControllerDetails;
use albmig_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::lab_controller::LabControllerRow;

/// Column list for `lab_controller_details` queries.
const COLUMNS: &str = "host, username, credentials_ref, last_fetched_at, updated_at";

/// Reads and overwrites the lab controller record.
pub struct LabControllerRepo;

impl LabControllerRepo {
    /// The configured controller, or `None` before the first save.
    pub async fn find(pool: &PgPool) -> Result<Option<LabControllerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lab_controller_details WHERE id = 1");
        sqlx::query_as::<_, LabControllerRow>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the record. A new record has never been fetched from.
    pub async fn upsert(
        pool: &PgPool,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO lab_controller_details (id, host, username, credentials_ref) \
             VALUES (1, $1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET \
                 host = EXCLUDED.host, \
                 username = EXCLUDED.username, \
                 credentials_ref = EXCLUDED.credentials_ref, \
                 last_fetched_at = NULL, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LabControllerRow>(&query)
            .bind(&input.host)
            .bind(&input.username)
            .bind(&input.credentials_ref)
            .fetch_one(pool)
            .await
    }

    /// Record a successful live fetch.
    pub async fn touch_fetched(
        pool: &PgPool,
        at: Timestamp,
    ) -> Result<Option<LabControllerRow>, sqlx::Error> {
        let query = format!(
            "UPDATE lab_controller_details SET last_fetched_at = $1 \
             WHERE id = 1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LabControllerRow>(&query)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
