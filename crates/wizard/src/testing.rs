//! In-process [`MigrationApi`] for unit tests.
//!
//! Keeps one run's virtual services and the lab controller record in memory
//! and applies the same transition rules as the server.

use std::sync::Mutex;

use albmig_core::lab_controller::{LabControllerDetails, SetLabControllerDetails};
use albmig_core::migration::{
    IncompleteMigrationsBatch, MigrationStatus, Transition, VirtualServiceMigration,
};
use albmig_core::overview::{MigrationOverview, StatusCounts};
use albmig_core::types::DbId;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use crate::api::{ClientError, MigrationApi};

pub const RUN_ID: DbId = 1;

/// A virtual service of [`RUN_ID`] with a fixed timestamp.
pub fn vs(id: DbId, name: &str, status: MigrationStatus) -> VirtualServiceMigration {
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    VirtualServiceMigration {
        id,
        run_id: RUN_ID,
        name: name.to_string(),
        f5_ref: format!("/Common/{name}"),
        avi_ref: None,
        vs_type: Some("standard".to_string()),
        status,
        created_at: at,
        updated_at: at,
    }
}

struct Gate {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
struct FakeState {
    items: Vec<VirtualServiceMigration>,
    lab_controller: Option<LabControllerDetails>,
    /// Virtual services the live pull discovers.
    inventory: Vec<VirtualServiceMigration>,
    controller_error: Option<ClientError>,
    failure: Option<ClientError>,
    calls: Vec<&'static str>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
    incomplete_gate: Mutex<Option<Gate>>,
    transition_gate: Mutex<Option<Gate>>,
}

/// Signal `entered` and wait for `release` if a gate is armed.
async fn pass(slot: &Mutex<Option<Gate>>) {
    let gate = slot.lock().unwrap().take();
    if let Some(gate) = gate {
        let _ = gate.entered.send(());
        let _ = gate.release.await;
    }
}

impl FakeApi {
    pub fn with_items(items: Vec<VirtualServiceMigration>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().items = items;
        api
    }

    /// Every call fails with `err` until [`recover`](Self::recover).
    pub fn fail_with(&self, err: ClientError) {
        self.state.lock().unwrap().failure = Some(err);
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failure = None;
    }

    /// The live pull fails with `err`.
    pub fn controller_fails_with(&self, err: ClientError) {
        self.state.lock().unwrap().controller_error = Some(err);
    }

    /// The live pull discovers `items` (merged by F5 reference).
    pub fn controller_inventory(&self, items: Vec<VirtualServiceMigration>) {
        let mut state = self.state.lock().unwrap();
        state.controller_error = None;
        state.inventory = items;
    }

    /// Change a status behind the client's back.
    pub fn set_status(&self, id: DbId, status: MigrationStatus) {
        let mut state = self.state.lock().unwrap();
        if let Some(item) = state.items.iter_mut().find(|vs| vs.id == id) {
            item.status = status;
        }
    }

    pub fn status_of(&self, id: DbId) -> Option<MigrationStatus> {
        let state = self.state.lock().unwrap();
        state.items.iter().find(|vs| vs.id == id).map(|vs| vs.status)
    }

    /// Names of the API operations called so far.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Make the next `incomplete_migrations` call signal `entered` and wait
    /// for `release` before answering.
    pub fn hold_next_incomplete(
        &self,
        entered: oneshot::Sender<()>,
        release: oneshot::Receiver<()>,
    ) {
        *self.incomplete_gate.lock().unwrap() = Some(Gate { entered, release });
    }

    /// Same as [`hold_next_incomplete`](Self::hold_next_incomplete) for the
    /// next status change; the change is applied after `release`.
    pub fn hold_next_transition(
        &self,
        entered: oneshot::Sender<()>,
        release: oneshot::Receiver<()>,
    ) {
        *self.transition_gate.lock().unwrap() = Some(Gate { entered, release });
    }

    fn begin(&self, call: &'static str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn batch(state: &FakeState) -> IncompleteMigrationsBatch {
        IncompleteMigrationsBatch::from_run(Some(RUN_ID), state.items.clone())
    }

    fn transition(
        &self,
        call: &'static str,
        id: DbId,
        target: MigrationStatus,
        avi_ref: Option<&str>,
    ) -> Result<VirtualServiceMigration, ClientError> {
        self.begin(call)?;
        let mut state = self.state.lock().unwrap();
        let item = state
            .items
            .iter_mut()
            .find(|vs| vs.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("VirtualServiceMigration {id}")))?;
        match item.status.transition_to(target) {
            Ok(Transition::Unchanged) => {}
            Ok(Transition::Applied) => {
                item.status = target;
                if let Some(avi_ref) = avi_ref {
                    item.avi_ref = Some(avi_ref.to_string());
                }
            }
            Err(e) => return Err(ClientError::Conflict(e.to_string())),
        }
        Ok(item.clone())
    }
}

#[async_trait]
impl MigrationApi for FakeApi {
    async fn overview(&self) -> Result<MigrationOverview, ClientError> {
        self.begin("overview")?;
        let state = self.state.lock().unwrap();
        let mut counts = StatusCounts::default();
        for item in &state.items {
            counts.add(item.status, 1);
        }
        Ok(MigrationOverview::from(counts))
    }

    async fn incomplete_migrations(&self) -> Result<IncompleteMigrationsBatch, ClientError> {
        self.begin("incomplete_migrations")?;
        pass(&self.incomplete_gate).await;
        let state = self.state.lock().unwrap();
        Ok(Self::batch(&state))
    }

    async fn lab_controller(&self) -> Result<Option<LabControllerDetails>, ClientError> {
        self.begin("lab_controller")?;
        Ok(self.state.lock().unwrap().lab_controller.clone())
    }

    async fn set_lab_controller(
        &self,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerDetails, ClientError> {
        self.begin("set_lab_controller")?;
        if input.host.trim().is_empty() {
            return Err(ClientError::Validation("Host must not be empty".to_string()));
        }
        let details = LabControllerDetails {
            host: input.host.clone(),
            username: input.username.clone(),
            credentials_ref: input.credentials_ref.clone(),
            last_fetched_at: None,
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().lab_controller = Some(details.clone());
        Ok(details)
    }

    async fn fetch_from_controller(&self) -> Result<IncompleteMigrationsBatch, ClientError> {
        self.begin("fetch_from_controller")?;
        let mut state = self.state.lock().unwrap();
        if state.lab_controller.is_none() {
            return Err(ClientError::Conflict("No lab controller configured".to_string()));
        }
        if let Some(err) = state.controller_error.clone() {
            return Err(err);
        }
        if let Some(details) = state.lab_controller.as_mut() {
            details.last_fetched_at = Some(Utc::now());
        }
        let inventory = std::mem::take(&mut state.inventory);
        for item in inventory {
            if !state.items.iter().any(|vs| vs.f5_ref == item.f5_ref) {
                state.items.push(item);
            }
        }
        Ok(Self::batch(&state))
    }

    async fn accept_configuration(
        &self,
        id: DbId,
        avi_ref: Option<&str>,
    ) -> Result<VirtualServiceMigration, ClientError> {
        pass(&self.transition_gate).await;
        self.transition("accept_configuration", id, MigrationStatus::Completed, avi_ref)
    }

    async fn skip_migration(&self, id: DbId) -> Result<VirtualServiceMigration, ClientError> {
        pass(&self.transition_gate).await;
        self.transition("skip_migration", id, MigrationStatus::Skipped, None)
    }

    async fn start_migration(&self, id: DbId) -> Result<VirtualServiceMigration, ClientError> {
        pass(&self.transition_gate).await;
        self.transition("start_migration", id, MigrationStatus::InReview, None)
    }
}
