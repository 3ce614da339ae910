pub mod configuration;
pub mod discovery;
pub mod lab_controller;
pub mod playbook;

use albmig_core::error::CoreError;
use albmig_core::migration::MigrationRun;
use albmig_db::ConfigurationStore;

use crate::error::{AppError, AppResult};

/// The current run, or a conflict telling the operator to import first.
pub(crate) async fn require_current_run(
    store: &dyn ConfigurationStore,
) -> AppResult<MigrationRun> {
    store.current_run().await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "No migration run exists yet; import discovery data first".to_string(),
        ))
    })
}
