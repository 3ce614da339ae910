//! Repository for the `playbooks` table.

use albmig_core::playbook::NewPlaybook;
use albmig_core::types::DbId;
use sqlx::PgPool;

use crate::models::playbook::PlaybookRow;

const COLUMNS: &str = "id, run_id, avi_output_id, name, task_count, body, created_at";

/// Appends and reads generated playbooks.
pub struct PlaybookRepo;

impl PlaybookRepo {
    pub async fn insert(
        pool: &PgPool,
        run_id: DbId,
        playbook: &NewPlaybook,
    ) -> Result<PlaybookRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO playbooks (run_id, avi_output_id, name, task_count, body) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlaybookRow>(&query)
            .bind(run_id)
            .bind(playbook.avi_output_id)
            .bind(&playbook.name)
            .bind(playbook.task_count)
            .bind(&playbook.body)
            .fetch_one(pool)
            .await
    }

    /// Playbooks of a run, newest first.
    pub async fn list_by_run(pool: &PgPool, run_id: DbId) -> Result<Vec<PlaybookRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playbooks WHERE run_id = $1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, PlaybookRow>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PlaybookRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playbooks WHERE id = $1");
        sqlx::query_as::<_, PlaybookRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
