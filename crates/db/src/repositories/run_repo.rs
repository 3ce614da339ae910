//! Repository for the `migration_runs` table.

use albmig_core::migration::DiscoveredVirtualService;
use sqlx::PgPool;

use crate::models::run::MigrationRunRow;

/// Column list for `migration_runs` queries.
const COLUMNS: &str = "id, label, created_at";

/// Creates and looks up discovery runs.
pub struct RunRepo;

impl RunRepo {
    /// Insert a run together with its discovered virtual services, in one
    /// transaction. Services are inserted in the given order so ascending id
    /// preserves import order.
    pub async fn create_with_services(
        pool: &PgPool,
        label: &str,
        services: &[DiscoveredVirtualService],
    ) -> Result<MigrationRunRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("INSERT INTO migration_runs (label) VALUES ($1) RETURNING {COLUMNS}");
        let run = sqlx::query_as::<_, MigrationRunRow>(&query)
            .bind(label)
            .fetch_one(&mut *tx)
            .await?;

        for vs in services {
            sqlx::query(
                "INSERT INTO virtual_service_migrations (run_id, name, f5_ref, vs_type) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(run.id)
            .bind(&vs.name)
            .bind(&vs.f5_ref)
            .bind(&vs.vs_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(run)
    }

    /// The most recent run, if any import has happened yet.
    pub async fn find_latest(pool: &PgPool) -> Result<Option<MigrationRunRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM migration_runs ORDER BY id DESC LIMIT 1");
        sqlx::query_as::<_, MigrationRunRow>(&query)
            .fetch_optional(pool)
            .await
    }
}
