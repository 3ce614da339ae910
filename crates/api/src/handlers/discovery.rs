//! Handlers for discovery import, the discovery report and its raw download.

use albmig_core::discovery::{
    DiscoveryExport, DiscoveryImport, DiscoveryReport, ImportedRun, DISCOVERY_EXPORT_FILE_NAME,
};
use albmig_core::error::CoreError;
use albmig_core::migration;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::response::{attachment, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /discovery/import
// ---------------------------------------------------------------------------

/// Start a new migration run from discovered virtual services.
///
/// The new run becomes the current one; earlier runs are kept.
pub async fn import_discovery(
    State(state): State<AppState>,
    Json(body): Json<DiscoveryImport>,
) -> AppResult<impl IntoResponse> {
    let label = body.label.trim();
    if label.is_empty() {
        return Err(CoreError::Validation("Run label must not be empty".to_string()).into());
    }
    migration::validate_import(&body.virtual_services)?;

    let run = state.store.create_run(label, &body.virtual_services).await?;

    tracing::info!(
        run_id = run.id,
        count = body.virtual_services.len(),
        "Discovery import created migration run"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImportedRun {
                run,
                imported_count: body.virtual_services.len(),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /discovery/report
// ---------------------------------------------------------------------------

/// Virtual service counts per F5 type for the current run.
pub async fn get_report(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = match state.store.current_run().await? {
        Some(run) => {
            let services = state.store.list_virtual_services(run.id).await?;
            DiscoveryReport::from_run(Some(run.id), &services)
        }
        None => DiscoveryReport::default(),
    };
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// GET /discovery/download-report
// ---------------------------------------------------------------------------

/// The current run's virtual services as `bigip_discovery_data.json`.
pub async fn download_report(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let run = state
        .store
        .current_run()
        .await?
        .ok_or_else(|| AppError::NotFound("No discovery data imported yet".to_string()))?;
    let virtual_services = state.store.list_virtual_services(run.id).await?;

    tracing::debug!(run_id = run.id, count = virtual_services.len(), "Discovery data exported");

    Ok((
        [(header::CONTENT_DISPOSITION, attachment(DISCOVERY_EXPORT_FILE_NAME))],
        Json(DiscoveryExport {
            run,
            exported_at: Utc::now(),
            virtual_services,
        }),
    ))
}
