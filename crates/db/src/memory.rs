//! In-memory [`ConfigurationStore`] with the same semantics as [`PgStore`].
//!
//! Used by `STORE_BACKEND=memory` for demos and by the HTTP tests. Ids come
//! from one increasing counter, so import order equals ascending id as with
//! BIGSERIAL.
//!
//! [`PgStore`]: crate::store::PgStore

use std::sync::atomic::{AtomicBool, Ordering};

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
use chrono::Utc;
use tokio::sync::RwLock;

use crate::store::ConfigurationStore;

#[derive(Default)]
struct Tables {
    runs: Vec<MigrationRun>,
    virtual_services: Vec<VirtualServiceMigration>,
    lab_controller: Option<LabControllerDetails>,
    conversion_status: Vec<ConversionStatusDocument>,
    avi_output: Vec<AviOutputDocument>,
    playbooks: Vec<Playbook>,
    next_id: DbId,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn insert_service(&mut self, run_id: DbId, vs: &DiscoveredVirtualService, now: Timestamp) {
        let id = self.next_id();
        self.virtual_services.push(VirtualServiceMigration {
            id,
            run_id,
            name: vs.name.clone(),
            f5_ref: vs.f5_ref.clone(),
            avi_ref: None,
            vs_type: vs.vs_type.clone(),
            status: MigrationStatus::Pending,
            created_at: now,
            updated_at: now,
        });
    }
}

/// Store kept entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while set, every call fails with
    /// `sqlx::Error::PoolTimedOut`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), sqlx::Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigurationStore for MemoryStore {
    async fn health_check(&self) -> Result<(), sqlx::Error> {
        self.check_available()
    }

    async fn current_run(&self) -> Result<Option<MigrationRun>, sqlx::Error> {
        self.check_available()?;
        Ok(self.tables.read().await.runs.last().cloned())
    }

    async fn create_run(
        &self,
        label: &str,
        services: &[DiscoveredVirtualService],
    ) -> Result<MigrationRun, sqlx::Error> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let run = MigrationRun {
            id: tables.next_id(),
            label: label.to_string(),
            created_at: now,
        };
        tables.runs.push(run.clone());
        for vs in services {
            tables.insert_service(run.id, vs, now);
        }
        Ok(run)
    }

    async fn list_virtual_services(
        &self,
        run_id: DbId,
    ) -> Result<Vec<VirtualServiceMigration>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .virtual_services
            .iter()
            .filter(|vs| vs.run_id == run_id)
            .cloned()
            .collect())
    }

    async fn status_counts(&self, run_id: DbId) -> Result<StatusCounts, sqlx::Error> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut counts = StatusCounts::default();
        for vs in tables.virtual_services.iter().filter(|vs| vs.run_id == run_id) {
            counts.add(vs.status, 1);
        }
        Ok(counts)
    }

    async fn find_virtual_service(
        &self,
        id: DbId,
    ) -> Result<Option<VirtualServiceMigration>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .virtual_services
            .iter()
            .find(|vs| vs.id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: DbId,
        status: MigrationStatus,
        avi_ref: Option<&str>,
    ) -> Result<Option<VirtualServiceMigration>, sqlx::Error> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let Some(vs) = tables.virtual_services.iter_mut().find(|vs| vs.id == id) else {
            return Ok(None);
        };
        if vs.status.transition_to(status).is_err() {
            return Ok(None);
        }
        vs.status = status;
        if let Some(avi_ref) = avi_ref {
            vs.avi_ref = Some(avi_ref.to_string());
        }
        vs.updated_at = Utc::now();
        Ok(Some(vs.clone()))
    }

    async fn merge_discovered(
        &self,
        run_id: DbId,
        services: &[DiscoveredVirtualService],
    ) -> Result<MergeSummary, sqlx::Error> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut summary = MergeSummary::default();
        for vs in services {
            let known = tables
                .virtual_services
                .iter()
                .any(|existing| existing.run_id == run_id && existing.f5_ref == vs.f5_ref);
            if known {
                summary.unchanged += 1;
            } else {
                tables.insert_service(run_id, vs, now);
                summary.inserted += 1;
            }
        }
        Ok(summary)
    }

    async fn lab_controller(&self) -> Result<Option<LabControllerDetails>, sqlx::Error> {
        self.check_available()?;
        Ok(self.tables.read().await.lab_controller.clone())
    }

    async fn set_lab_controller(
        &self,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerDetails, sqlx::Error> {
        self.check_available()?;
        let details = LabControllerDetails {
            host: input.host.clone(),
            username: input.username.clone(),
            credentials_ref: input.credentials_ref.clone(),
            last_fetched_at: None,
            updated_at: Utc::now(),
        };
        self.tables.write().await.lab_controller = Some(details.clone());
        Ok(details)
    }

    async fn mark_lab_controller_fetched(
        &self,
        at: Timestamp,
    ) -> Result<Option<LabControllerDetails>, sqlx::Error> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.lab_controller.as_mut().map(|details| {
            details.last_fetched_at = Some(at);
            details.clone()
        }))
    }

    async fn insert_conversion_status(
        &self,
        run_id: DbId,
        doc: &NewConversionStatus,
    ) -> Result<ConversionStatusDocument, sqlx::Error> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = ConversionStatusDocument {
            id: tables.next_id(),
            run_id,
            schema_version: doc.schema_version,
            status_sheet: doc.status_sheet.clone(),
            pivot_sheet: doc.pivot_sheet.clone(),
            irule_discovery: doc.irule_discovery.clone(),
            created_at: Utc::now(),
        };
        tables.conversion_status.push(stored.clone());
        Ok(stored)
    }

    async fn latest_conversion_status(
        &self,
        run_id: DbId,
    ) -> Result<Option<ConversionStatusDocument>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .conversion_status
            .iter()
            .rev()
            .find(|doc| doc.run_id == run_id)
            .cloned())
    }

    async fn insert_avi_output(
        &self,
        run_id: DbId,
        doc: &NewAviOutput,
    ) -> Result<AviOutputDocument, sqlx::Error> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = AviOutputDocument {
            id: tables.next_id(),
            run_id,
            schema_version: doc.schema_version,
            body: doc.body.clone(),
            created_at: Utc::now(),
        };
        tables.avi_output.push(stored.clone());
        Ok(stored)
    }

    async fn latest_avi_output(
        &self,
        run_id: DbId,
    ) -> Result<Option<AviOutputDocument>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .avi_output
            .iter()
            .rev()
            .find(|doc| doc.run_id == run_id)
            .cloned())
    }

    async fn insert_playbook(
        &self,
        run_id: DbId,
        playbook: &NewPlaybook,
    ) -> Result<Playbook, sqlx::Error> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = Playbook {
            id: tables.next_id(),
            run_id,
            avi_output_id: playbook.avi_output_id,
            name: playbook.name.clone(),
            task_count: playbook.task_count,
            body: playbook.body.clone(),
            created_at: Utc::now(),
        };
        tables.playbooks.push(stored.clone());
        Ok(stored)
    }

    async fn list_playbooks(&self, run_id: DbId) -> Result<Vec<Playbook>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .playbooks
            .iter()
            .rev()
            .filter(|p| p.run_id == run_id)
            .cloned()
            .collect())
    }

    async fn find_playbook(&self, id: DbId) -> Result<Option<Playbook>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .playbooks
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}
