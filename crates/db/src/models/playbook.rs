//! Playbook rows.

use albmig_core::playbook::Playbook;
use albmig_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `playbooks` table.
#[derive(Debug, Clone, FromRow)]
pub struct PlaybookRow {
    pub id: DbId,
    pub run_id: DbId,
    pub avi_output_id: DbId,
    pub name: String,
    pub task_count: i32,
    pub body: serde_json::Value,
    pub created_at: Timestamp,
}

impl From<PlaybookRow> for Playbook {
    fn from(row: PlaybookRow) -> Self {
        Self {
            id: row.id,
            run_id: row.run_id,
            avi_output_id: row.avi_output_id,
            name: row.name,
            task_count: row.task_count,
            body: row.body,
            created_at: row.created_at,
        }
    }
}
