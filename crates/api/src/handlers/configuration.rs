//! Handlers for migration progress and per-virtual-service review.
//!
//! Everything here is scoped to the current (most recent) migration run.

use albmig_core::conversion::{self, GenerateConfiguration, GeneratedConfiguration};
use albmig_core::error::CoreError;
use albmig_core::migration::{
    AcceptConfiguration, IncompleteMigrationsBatch, MigrationRef, MigrationStatus,
    Transition, VirtualServiceMigration,
};
use albmig_core::overview::{MigrationOverview, StatusCounts};
use albmig_core::types::DbId;
use albmig_db::ConfigurationStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::require_current_run;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the review worklist of the current run.
///
/// Shared with the live-fetch handler, which returns the refreshed batch.
pub async fn incomplete_batch(
    store: &dyn ConfigurationStore,
) -> Result<IncompleteMigrationsBatch, sqlx::Error> {
    let Some(run) = store.current_run().await? else {
        return Ok(IncompleteMigrationsBatch::default());
    };
    let all = store.list_virtual_services(run.id).await?;
    Ok(IncompleteMigrationsBatch::from_run(Some(run.id), all))
}

/// Move one virtual service to `target`, applying the transition rules.
///
/// Reapplying the current status returns the row unchanged without a write.
/// The rule is checked again by the guarded write in the store, so a row
/// completed by a concurrent request is never reopened.
async fn transition(
    store: &dyn ConfigurationStore,
    id: DbId,
    target: MigrationStatus,
    avi_ref: Option<&str>,
) -> AppResult<VirtualServiceMigration> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "VirtualServiceMigration",
            id,
        })
    };

    let current = store.find_virtual_service(id).await?.ok_or_else(not_found)?;

    match current.status.transition_to(target)? {
        Transition::Unchanged => {
            tracing::debug!(migration_id = id, status = %target, "Status already set; no-op");
            Ok(current)
        }
        Transition::Applied => {
            let Some(updated) = store.update_status(id, target, avi_ref).await? else {
                // Another request completed the row (or removed it) between
                // the read and the guarded write.
                let latest = store.find_virtual_service(id).await?.ok_or_else(not_found)?;
                return match latest.status.transition_to(target)? {
                    Transition::Unchanged => Ok(latest),
                    Transition::Applied => Err(AppError::Core(CoreError::Conflict(format!(
                        "Virtual service migration {id} changed concurrently; retry"
                    )))),
                };
            };
            tracing::info!(
                migration_id = id,
                run_id = updated.run_id,
                from = %current.status,
                to = %target,
                "Virtual service migration status changed"
            );
            Ok(updated)
        }
    }
}

// ---------------------------------------------------------------------------
// GET /configuration/overview
// ---------------------------------------------------------------------------

/// Aggregate counts for the current run. Recomputed on every request.
pub async fn get_overview(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let counts = match state.store.current_run().await? {
        Some(run) => state.store.status_counts(run.id).await?,
        None => StatusCounts::default(),
    };
    Ok(Json(DataResponse {
        data: MigrationOverview::from(counts),
    }))
}

// ---------------------------------------------------------------------------
// GET /configuration/incomplete-migrations
// ---------------------------------------------------------------------------

/// Every virtual service still needing review, in import order.
pub async fn get_incomplete_migrations(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let batch = incomplete_batch(state.store.as_ref()).await?;
    Ok(Json(DataResponse { data: batch }))
}

// ---------------------------------------------------------------------------
// POST /configuration/accept-configuration
// ---------------------------------------------------------------------------

/// Mark a virtual service completed, optionally recording its Avi name.
pub async fn accept_configuration(
    State(state): State<AppState>,
    Json(body): Json<AcceptConfiguration>,
) -> AppResult<impl IntoResponse> {
    let avi_ref = body
        .avi_ref
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let updated = transition(
        state.store.as_ref(),
        body.id,
        MigrationStatus::Completed,
        avi_ref,
    )
    .await?;
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /configuration/skip-migration
// ---------------------------------------------------------------------------

pub async fn skip_migration(
    State(state): State<AppState>,
    Json(body): Json<MigrationRef>,
) -> AppResult<impl IntoResponse> {
    let updated = transition(
        state.store.as_ref(),
        body.id,
        MigrationStatus::Skipped,
        None,
    )
    .await?;
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /configuration/start-migration
// ---------------------------------------------------------------------------

/// Mark a virtual service as under review (the operator opened the editor).
pub async fn start_migration(
    State(state): State<AppState>,
    Json(body): Json<MigrationRef>,
) -> AppResult<impl IntoResponse> {
    let updated = transition(
        state.store.as_ref(),
        body.id,
        MigrationStatus::InReview,
        None,
    )
    .await?;
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /configuration/generate-configuration
// ---------------------------------------------------------------------------

/// Append converter output (conversion status + Avi output) to the current run.
pub async fn generate_configuration(
    State(state): State<AppState>,
    Json(body): Json<GenerateConfiguration>,
) -> AppResult<impl IntoResponse> {
    conversion::validate_conversion_status(&body.conversion_status)?;
    conversion::validate_avi_output(&body.avi_output)?;

    let run = require_current_run(state.store.as_ref()).await?;

    let conversion_status = state
        .store
        .insert_conversion_status(run.id, &body.conversion_status)
        .await?;
    let avi_output = state
        .store
        .insert_avi_output(run.id, &body.avi_output)
        .await?;

    tracing::info!(
        run_id = run.id,
        conversion_status_id = conversion_status.id,
        avi_output_id = avi_output.id,
        "Configuration documents stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GeneratedConfiguration {
                conversion_status,
                avi_output,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /configuration/conversion-status
// ---------------------------------------------------------------------------

pub async fn get_conversion_status(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let run = require_current_run(state.store.as_ref()).await?;
    let doc = state
        .store
        .latest_conversion_status(run.id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No conversion status stored for run {}", run.id))
        })?;
    Ok(Json(DataResponse { data: doc }))
}

// ---------------------------------------------------------------------------
// GET /configuration/avi-output
// ---------------------------------------------------------------------------

pub async fn get_avi_output(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let run = require_current_run(state.store.as_ref()).await?;
    let doc = state
        .store
        .latest_avi_output(run.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No Avi output stored for run {}", run.id)))?;
    Ok(Json(DataResponse { data: doc }))
}
