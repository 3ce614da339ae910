//! Handlers for the lab controller record and the live pull from it.

use albmig_core::error::CoreError;
use albmig_core::lab_controller::{self, SetLabControllerDetails};
use albmig_core::migration;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::controller::ControllerTarget;
use crate::error::{AppError, AppResult};
use crate::handlers::configuration::incomplete_batch;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /configuration/lab-controller
// ---------------------------------------------------------------------------

/// The configured lab controller; 404 until one has been saved.
pub async fn get_lab_controller(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let details = state
        .store
        .lab_controller()
        .await?
        .ok_or_else(|| AppError::NotFound("No lab controller configured".to_string()))?;
    Ok(Json(DataResponse { data: details }))
}

// ---------------------------------------------------------------------------
// POST /configuration/lab-controller
// ---------------------------------------------------------------------------

/// Overwrite the lab controller record.
///
/// Only the shape of the input is validated; reachability is left to the
/// live fetch.
pub async fn set_lab_controller(
    State(state): State<AppState>,
    Json(body): Json<SetLabControllerDetails>,
) -> AppResult<impl IntoResponse> {
    let input = body.normalized();
    lab_controller::validate_details(&input)?;

    let details = state.store.set_lab_controller(&input).await?;

    tracing::info!(host = %details.host, username = %details.username, "Lab controller details saved");

    Ok(Json(DataResponse { data: details }))
}

// ---------------------------------------------------------------------------
// POST /configuration/fetch-from-controller
// ---------------------------------------------------------------------------

/// Pull virtual servers from the lab controller, merge them into the current
/// run (creating one if needed), and return the refreshed worklist.
///
/// The stored controller details are only touched on success (to stamp
/// `lastFetchedAt`).
pub async fn fetch_from_controller(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let details = state.store.lab_controller().await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "No lab controller configured; set its details first".to_string(),
        ))
    })?;

    let password = state.secrets.secret(&details.credentials_ref).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(format!(
            "Credentials reference '{}' is not set on the server",
            details.credentials_ref
        )))
    })?;

    let target = ControllerTarget {
        host: details.host.clone(),
        username: details.username.clone(),
        password,
    };

    let discovered = state
        .controller
        .list_virtual_services(&target)
        .await
        .map_err(CoreError::from)?;

    let (valid, invalid): (Vec<_>, Vec<_>) = discovered
        .into_iter()
        .partition(|vs| migration::validate_discovered(vs).is_ok());
    if !invalid.is_empty() {
        tracing::warn!(
            host = %details.host,
            dropped = invalid.len(),
            "Ignoring malformed virtual servers from controller"
        );
    }

    let run = match state.store.current_run().await? {
        Some(run) => run,
        None => {
            state
                .store
                .create_run(&format!("Live fetch from {}", details.host), &[])
                .await?
        }
    };

    let summary = state.store.merge_discovered(run.id, &valid).await?;
    state.store.mark_lab_controller_fetched(Utc::now()).await?;

    tracing::info!(
        host = %details.host,
        run_id = run.id,
        inserted = summary.inserted,
        unchanged = summary.unchanged,
        "Fetched virtual services from lab controller"
    );

    let batch = incomplete_batch(state.store.as_ref()).await?;
    Ok(Json(DataResponse { data: batch }))
}
