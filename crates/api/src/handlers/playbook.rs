//! Handlers for Ansible playbooks built from the current run's Avi output.

use albmig_core::error::CoreError;
use albmig_core::playbook::{self, GeneratePlaybook, PlaybookSummary};
use albmig_core::types::DbId;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::require_current_run;
use crate::response::{attachment, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /playbook/generate-playbook
// ---------------------------------------------------------------------------

/// Build a playbook from the newest Avi output of the current run and store
/// it. Earlier playbooks are kept.
pub async fn generate_playbook(
    State(state): State<AppState>,
    Json(body): Json<GeneratePlaybook>,
) -> AppResult<impl IntoResponse> {
    let run = require_current_run(state.store.as_ref()).await?;
    let avi_output = state.store.latest_avi_output(run.id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "No Avi output stored for run {}; generate the configuration first",
            run.id
        )))
    })?;

    let new = playbook::build_playbook(&body.name_for(run.id), &avi_output)?;
    let stored = state.store.insert_playbook(run.id, &new).await?;

    tracing::info!(
        run_id = run.id,
        playbook_id = stored.id,
        avi_output_id = avi_output.id,
        tasks = stored.task_count,
        "Playbook generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PlaybookSummary::from(stored),
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /playbook/playbooks
// ---------------------------------------------------------------------------

/// Playbooks of the current run, newest first. Empty before any import.
pub async fn list_playbooks(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let playbooks: Vec<PlaybookSummary> = match state.store.current_run().await? {
        Some(run) => state
            .store
            .list_playbooks(run.id)
            .await?
            .into_iter()
            .map(PlaybookSummary::from)
            .collect(),
        None => Vec::new(),
    };
    Ok(Json(DataResponse { data: playbooks }))
}

// ---------------------------------------------------------------------------
// GET /playbook/download-playbook/{id}
// ---------------------------------------------------------------------------

/// The playbook document as a file download.
pub async fn download_playbook(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let playbook = state
        .store
        .find_playbook(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Playbook",
            id,
        }))?;

    Ok((
        [(header::CONTENT_DISPOSITION, attachment(&playbook.file_name()))],
        Json(playbook.body),
    ))
}
