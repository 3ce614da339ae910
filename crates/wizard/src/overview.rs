//! Dashboard counts for the current run.

use std::sync::Arc;

use albmig_core::overview::MigrationOverview;

use crate::api::{ClientError, MigrationApi};

/// Read-only view of migration progress.
///
/// Deliberately holds no cache: every call goes to the server so the counts
/// follow accepted configuration even while the tracker's batch is stale.
#[derive(Clone)]
pub struct OverviewProvider {
    api: Arc<dyn MigrationApi>,
}

impl OverviewProvider {
    pub fn new(api: Arc<dyn MigrationApi>) -> Self {
        Self { api }
    }

    pub async fn get_overview(&self) -> Result<MigrationOverview, ClientError> {
        self.api.overview().await
    }
}
