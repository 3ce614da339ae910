//! The Configuration Store seam.
//!
//! Handlers depend on [`ConfigurationStore`] rather than on a pool so the
//! same routes run over PostgreSQL ([`PgStore`]) or in memory
//! ([`MemoryStore`](crate::memory::MemoryStore)). Both report failures as
//! `sqlx::Error` so the HTTP layer classifies them in one place.

use albmig_core::conversion::{
    AviOutputDocument, ConversionStatusDocument, NewAviOutput, NewConversionStatus,
};
use albmig_core::lab_controller::{LabControllerDetails, SetLabControllerDetails};
use albmig_core::migration::{
    DiscoveredVirtualService, MergeSummary, MigrationRun, MigrationStatus,
    VirtualServiceMigration,
};
use albmig_core::overview::StatusCounts;
use albmig_core::playbook::{NewPlaybook, Playbook};
use albmig_core::types::{DbId, Timestamp};
use async_trait::async_trait;

use crate::models::decode_error;
use crate::models::virtual_service::into_domain;
use crate::repositories::{
    ConversionRepo, LabControllerRepo, PlaybookRepo, RunRepo, VirtualServiceRepo,
};
use crate::DbPool;

/// Persistence operations the migration tracker needs.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Cheap reachability check.
    async fn health_check(&self) -> Result<(), sqlx::Error>;

    /// The most recent run.
    async fn current_run(&self) -> Result<Option<MigrationRun>, sqlx::Error>;

    /// Start a new run with the given virtual services, all `pending`.
    async fn create_run(
        &self,
        label: &str,
        services: &[DiscoveredVirtualService],
    ) -> Result<MigrationRun, sqlx::Error>;

    /// Every virtual service of a run, in import order.
    async fn list_virtual_services(
        &self,
        run_id: DbId,
    ) -> Result<Vec<VirtualServiceMigration>, sqlx::Error>;

    async fn status_counts(&self, run_id: DbId) -> Result<StatusCounts, sqlx::Error>;

    async fn find_virtual_service(
        &self,
        id: DbId,
    ) -> Result<Option<VirtualServiceMigration>, sqlx::Error>;

    /// Persist a status.
    ///
    /// The write is guarded in the same step: a row that is already
    /// `completed` keeps its status and `None` is returned, so concurrent
    /// writers cannot reopen it.
    async fn update_status(
        &self,
        id: DbId,
        status: MigrationStatus,
        avi_ref: Option<&str>,
    ) -> Result<Option<VirtualServiceMigration>, sqlx::Error>;

    /// Add virtual services the run does not know yet (matched by `f5_ref`).
    async fn merge_discovered(
        &self,
        run_id: DbId,
        services: &[DiscoveredVirtualService],
    ) -> Result<MergeSummary, sqlx::Error>;

    async fn lab_controller(&self) -> Result<Option<LabControllerDetails>, sqlx::Error>;

    /// Overwrite the lab controller record.
    async fn set_lab_controller(
        &self,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerDetails, sqlx::Error>;

    /// Stamp the time of the last successful live fetch.
    async fn mark_lab_controller_fetched(
        &self,
        at: Timestamp,
    ) -> Result<Option<LabControllerDetails>, sqlx::Error>;

    async fn insert_conversion_status(
        &self,
        run_id: DbId,
        doc: &NewConversionStatus,
    ) -> Result<ConversionStatusDocument, sqlx::Error>;

    async fn latest_conversion_status(
        &self,
        run_id: DbId,
    ) -> Result<Option<ConversionStatusDocument>, sqlx::Error>;

    async fn insert_avi_output(
        &self,
        run_id: DbId,
        doc: &NewAviOutput,
    ) -> Result<AviOutputDocument, sqlx::Error>;

    async fn latest_avi_output(
        &self,
        run_id: DbId,
    ) -> Result<Option<AviOutputDocument>, sqlx::Error>;

    async fn insert_playbook(
        &self,
        run_id: DbId,
        playbook: &NewPlaybook,
    ) -> Result<Playbook, sqlx::Error>;

    /// Playbooks of a run, newest first.
    async fn list_playbooks(&self, run_id: DbId) -> Result<Vec<Playbook>, sqlx::Error>;

    async fn find_playbook(&self, id: DbId) -> Result<Option<Playbook>, sqlx::Error>;
}

/// PostgreSQL-backed store delegating to the repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ConfigurationStore for PgStore {
    async fn health_check(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }

    async fn current_run(&self) -> Result<Option<MigrationRun>, sqlx::Error> {
        Ok(RunRepo::find_latest(&self.pool).await?.map(Into::into))
    }

    async fn create_run(
        &self,
        label: &str,
        services: &[DiscoveredVirtualService],
    ) -> Result<MigrationRun, sqlx::Error> {
        let row = RunRepo::create_with_services(&self.pool, label, services).await?;
        tracing::debug!(run_id = row.id, count = services.len(), "Migration run created");
        Ok(row.into())
    }

    async fn list_virtual_services(
        &self,
        run_id: DbId,
    ) -> Result<Vec<VirtualServiceMigration>, sqlx::Error> {
        into_domain(VirtualServiceRepo::list_by_run(&self.pool, run_id).await?)
    }

    async fn status_counts(&self, run_id: DbId) -> Result<StatusCounts, sqlx::Error> {
        let mut counts = StatusCounts::default();
        for (status, n) in VirtualServiceRepo::count_by_status(&self.pool, run_id).await? {
            let status = MigrationStatus::from_str_db(&status).map_err(decode_error)?;
            counts.add(status, n);
        }
        Ok(counts)
    }

    async fn find_virtual_service(
        &self,
        id: DbId,
    ) -> Result<Option<VirtualServiceMigration>, sqlx::Error> {
        VirtualServiceRepo::find_by_id(&self.pool, id)
            .await?
            .map(|row| VirtualServiceMigration::try_from(row).map_err(decode_error))
            .transpose()
    }

    async fn update_status(
        &self,
        id: DbId,
        status: MigrationStatus,
        avi_ref: Option<&str>,
    ) -> Result<Option<VirtualServiceMigration>, sqlx::Error> {
        VirtualServiceRepo::update_status(&self.pool, id, status.as_str(), avi_ref)
            .await?
            .map(|row| VirtualServiceMigration::try_from(row).map_err(decode_error))
            .transpose()
    }

    async fn merge_discovered(
        &self,
        run_id: DbId,
        services: &[DiscoveredVirtualService],
    ) -> Result<MergeSummary, sqlx::Error> {
        let inserted = VirtualServiceRepo::insert_missing(&self.pool, run_id, services).await?;
        Ok(MergeSummary {
            inserted,
            unchanged: services.len() - inserted,
        })
    }

    async fn lab_controller(&self) -> Result<Option<LabControllerDetails>, sqlx::Error> {
        Ok(LabControllerRepo::find(&self.pool).await?.map(Into::into))
    }

    async fn set_lab_controller(
        &self,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerDetails, sqlx::Error> {
        Ok(LabControllerRepo::upsert(&self.pool, input).await?.into())
    }

    async fn mark_lab_controller_fetched(
        &self,
        at: Timestamp,
    ) -> Result<Option<LabControllerDetails>, sqlx::Error> {
        Ok(LabControllerRepo::touch_fetched(&self.pool, at)
            .await?
            .map(Into::into))
    }

    async fn insert_conversion_status(
        &self,
        run_id: DbId,
        doc: &NewConversionStatus,
    ) -> Result<ConversionStatusDocument, sqlx::Error> {
        Ok(ConversionRepo::insert_status(&self.pool, run_id, doc)
            .await?
            .into())
    }

    async fn latest_conversion_status(
        &self,
        run_id: DbId,
    ) -> Result<Option<ConversionStatusDocument>, sqlx::Error> {
        Ok(ConversionRepo::latest_status(&self.pool, run_id)
            .await?
            .map(Into::into))
    }

    async fn insert_avi_output(
        &self,
        run_id: DbId,
        doc: &NewAviOutput,
    ) -> Result<AviOutputDocument, sqlx::Error> {
        Ok(ConversionRepo::insert_avi_output(&self.pool, run_id, doc)
            .await?
            .into())
    }

    async fn latest_avi_output(
        &self,
        run_id: DbId,
    ) -> Result<Option<AviOutputDocument>, sqlx::Error> {
        Ok(ConversionRepo::latest_avi_output(&self.pool, run_id)
            .await?
            .map(Into::into))
    }

    async fn insert_playbook(
        &self,
        run_id: DbId,
        playbook: &NewPlaybook,
    ) -> Result<Playbook, sqlx::Error> {
        Ok(PlaybookRepo::insert(&self.pool, run_id, playbook).await?.into())
    }

    async fn list_playbooks(&self, run_id: DbId) -> Result<Vec<Playbook>, sqlx::Error> {
        Ok(PlaybookRepo::list_by_run(&self.pool, run_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn find_playbook(&self, id: DbId) -> Result<Option<Playbook>, sqlx::Error> {
        Ok(PlaybookRepo::find_by_id(&self.pool, id).await?.map(Into::into))
    }
}
