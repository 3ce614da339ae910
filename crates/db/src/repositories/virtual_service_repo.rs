//! Repository for the `virtual_service_migrations` table.

use albmig_core::migration::DiscoveredVirtualService;
use albmig_core::types::DbId;
use sqlx::PgPool;

use crate::models::virtual_service::VirtualServiceMigrationRow;

/// Column list for `virtual_service_migrations` queries.
const COLUMNS: &str = "id, run_id, name, f5_ref, avi_ref, vs_type, status, created_at, updated_at";

/// Reads and transitions virtual service migrations.
pub struct VirtualServiceRepo;

impl VirtualServiceRepo {
    /// All virtual services of a run in import order.
    pub async fn list_by_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<VirtualServiceMigrationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM virtual_service_migrations \
             WHERE run_id = $1 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, VirtualServiceMigrationRow>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }

    /// Find a virtual service migration by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VirtualServiceMigrationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM virtual_service_migrations WHERE id = $1");
        sqlx::query_as::<_, VirtualServiceMigrationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count virtual services of a run grouped by status.
    pub async fn count_by_status(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM virtual_service_migrations \
             WHERE run_id = $1 \
             GROUP BY status",
        )
        .bind(run_id)
        .fetch_all(pool)
        .await
    }

    /// Set the status of a virtual service. `avi_ref` replaces the stored one
    /// only when given.
    ///
    /// A completed row is never moved to another status: the write matches
    /// no row and `None` is returned, as for an unknown id.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        avi_ref: Option<&str>,
    ) -> Result<Option<VirtualServiceMigrationRow>, sqlx::Error> {
        let query = format!(
            "UPDATE virtual_service_migrations \
             SET status = $2, avi_ref = COALESCE($3, avi_ref), updated_at = NOW() \
             WHERE id = $1 AND (status <> 'completed' OR status = $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VirtualServiceMigrationRow>(&query)
            .bind(id)
            .bind(status)
            .bind(avi_ref)
            .fetch_optional(pool)
            .await
    }

    /// Insert discovered virtual services that the run does not know yet.
    ///
    /// Returns how many rows were inserted; existing `f5_ref`s are left
    /// untouched, whatever their status.
    pub async fn insert_missing(
        pool: &PgPool,
        run_id: DbId,
        services: &[DiscoveredVirtualService],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;
        for vs in services {
            let result = sqlx::query(
                "INSERT INTO virtual_service_migrations (run_id, name, f5_ref, vs_type) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT ON CONSTRAINT uq_virtual_service_migrations_run_f5_ref DO NOTHING",
            )
            .bind(run_id)
            .bind(&vs.name)
            .bind(&vs.f5_ref)
            .bind(&vs.vs_type)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }
        tx.commit().await?;
        Ok(inserted)
    }
}
