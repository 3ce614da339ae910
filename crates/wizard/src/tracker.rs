//! The review worklist of the current migration run.
//!
//! Between two full fetches the batch is a local projection: status changes
//! are applied optimistically and only reconciled with the server on the next
//! [`IncompleteMigrationTracker::fetch_incomplete`]. A virtual service marked
//! completed locally keeps its position in `items` so indices held by the
//! wizard stay aligned until that fetch.

use std::sync::Arc;

use albmig_core::migration::{
    IncompleteMigrationsBatch, MigrationStatus, Transition, VirtualServiceMigration,
};
use albmig_core::types::DbId;
use tokio::sync::RwLock;

use crate::api::{ClientError, MigrationApi};

/// Outcome of a full fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The response replaced the in-memory batch.
    Applied,
    /// A newer fetch, replacement or teardown happened while this one was in
    /// flight; its response was dropped.
    Discarded,
}

/// Local status change to push to the server.
#[derive(Debug, Clone, Copy)]
enum Action<'a> {
    Complete { avi_ref: Option<&'a str> },
    Skip,
    Review,
}

impl Action<'_> {
    fn target(&self) -> MigrationStatus {
        match self {
            Action::Complete { .. } => MigrationStatus::Completed,
            Action::Skip => MigrationStatus::Skipped,
            Action::Review => MigrationStatus::InReview,
        }
    }
}

#[derive(Default)]
struct TrackerState {
    batch: IncompleteMigrationsBatch,
    /// Bumped by every fetch, replacement and teardown.
    generation: u64,
}

/// What an optimistic update overwrote, for rollback.
struct Undo {
    generation: u64,
    status: MigrationStatus,
    avi_ref: Option<String>,
}

/// Ordered worklist of virtual services still needing review.
///
/// Cheaply cloneable; clones share the same batch.
#[derive(Clone)]
pub struct IncompleteMigrationTracker {
    api: Arc<dyn MigrationApi>,
    state: Arc<RwLock<TrackerState>>,
}

impl IncompleteMigrationTracker {
    pub fn new(api: Arc<dyn MigrationApi>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(TrackerState::default())),
        }
    }

    /// Copy of the current batch.
    pub async fn snapshot(&self) -> IncompleteMigrationsBatch {
        self.state.read().await.batch.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.batch.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.batch.is_empty()
    }

    /// The item at `index`, if any.
    pub async fn item(&self, index: usize) -> Option<VirtualServiceMigration> {
        self.state.read().await.batch.items.get(index).cloned()
    }

    /// Items still pending, in review or skipped in the local projection.
    pub async fn remaining(&self) -> usize {
        self.state
            .read()
            .await
            .batch
            .items
            .iter()
            .filter(|vs| vs.status.is_incomplete())
            .count()
    }

    /// Replace the batch with the server's current worklist.
    ///
    /// On failure the previous batch is left untouched. A response that
    /// arrives after a newer fetch, [`replace`](Self::replace) or
    /// [`invalidate`](Self::invalidate) is discarded.
    pub async fn fetch_incomplete(&self) -> Result<Refresh, ClientError> {
        let generation = self.bump().await;

        let batch = self.api.incomplete_migrations().await?;

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "Discarding stale incomplete-migrations response"
            );
            return Ok(Refresh::Discarded);
        }
        tracing::debug!(
            run_id = ?batch.run_id,
            items = batch.len(),
            completed = batch.completed_count,
            "Incomplete migrations refreshed"
        );
        state.batch = batch;
        Ok(Refresh::Applied)
    }

    /// Install a batch obtained elsewhere (the live pull returns one).
    pub async fn replace(&self, batch: IncompleteMigrationsBatch) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.batch = batch;
    }

    /// Drop any in-flight fetch result. Used on teardown.
    pub async fn invalidate(&self) {
        self.bump().await;
    }

    /// Mark a virtual service completed, optionally recording its Avi name.
    ///
    /// Idempotent: a second call for the same id does nothing.
    pub async fn mark_completed(&self, id: DbId, avi_ref: Option<&str>) -> Result<(), ClientError> {
        self.apply(id, Action::Complete { avi_ref }).await
    }

    pub async fn mark_skipped(&self, id: DbId) -> Result<(), ClientError> {
        self.apply(id, Action::Skip).await
    }

    /// Mark a virtual service as being reviewed in the editor.
    pub async fn mark_in_review(&self, id: DbId) -> Result<(), ClientError> {
        self.apply(id, Action::Review).await
    }

    // ---- private helpers ----

    async fn bump(&self) -> u64 {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.generation
    }

    /// Optimistically apply `action`, push it, and roll back on failure.
    async fn apply(&self, id: DbId, action: Action<'_>) -> Result<(), ClientError> {
        let target = action.target();

        let Some(undo) = self.apply_local(id, &action).await? else {
            tracing::debug!(migration_id = id, status = %target, "Status already set; no-op");
            return Ok(());
        };

        let result = match action {
            Action::Complete { avi_ref } => self.api.accept_configuration(id, avi_ref).await,
            Action::Skip => self.api.skip_migration(id).await,
            Action::Review => self.api.start_migration(id).await,
        };

        match result {
            Ok(row) => {
                self.reconcile(row, undo.generation).await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(migration_id = id, status = %target, error = %err, "Status change failed; rolling back");
                self.rollback(id, target, undo).await;
                Err(err)
            }
        }
    }

    /// Apply the transition to the in-memory batch. `None` means the item
    /// already has the target status.
    async fn apply_local(&self, id: DbId, action: &Action<'_>) -> Result<Option<Undo>, ClientError> {
        let target = action.target();
        let mut state = self.state.write().await;
        let generation = state.generation;

        let item = state
            .batch
            .items
            .iter_mut()
            .find(|vs| vs.id == id)
            .ok_or_else(|| {
                ClientError::NotFound(format!(
                    "Virtual service migration {id} is not in the current batch"
                ))
            })?;

        match item.status.transition_to(target) {
            Ok(Transition::Unchanged) => return Ok(None),
            Ok(Transition::Applied) => {}
            Err(e) => return Err(ClientError::Conflict(e.to_string())),
        }

        let undo = Undo {
            generation,
            status: item.status,
            avi_ref: item.avi_ref.clone(),
        };
        item.status = target;
        if let Action::Complete {
            avi_ref: Some(avi_ref),
        } = action
        {
            item.avi_ref = Some((*avi_ref).to_string());
        }
        if target == MigrationStatus::Completed {
            state.batch.completed_count += 1;
        }
        Ok(Some(undo))
    }

    /// Adopt the server's copy of an updated row, unless the batch has been
    /// replaced since the optimistic update. A newer batch already reflects
    /// the server, and its completed count must not drift from its items.
    async fn reconcile(&self, row: VirtualServiceMigration, generation: u64) {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return;
        }
        if let Some(item) = state.batch.items.iter_mut().find(|vs| vs.id == row.id) {
            *item = row;
        }
    }

    /// Undo an optimistic update unless the batch has been replaced since.
    async fn rollback(&self, id: DbId, target: MigrationStatus, undo: Undo) {
        let mut state = self.state.write().await;
        if state.generation != undo.generation {
            return;
        }
        let Some(item) = state.batch.items.iter_mut().find(|vs| vs.id == id) else {
            return;
        };
        if item.status != target {
            return;
        }
        item.status = undo.status;
        item.avi_ref = undo.avi_ref;
        if target == MigrationStatus::Completed {
            state.batch.completed_count -= 1;
        }
    }
}
