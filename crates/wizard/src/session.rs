//! Lab controller details and live pulls from the controller.
//!
//! ```text
//! Unconfigured --set_details--> Configured(NeverSynced)
//! Configured --fetch fails-->   Configured(Failed { error })
//! Configured --fetch ok-->      Configured(Synced { at })
//! ```
//!
//! Every state can be re-entered; `set_details` always restarts at
//! `NeverSynced`.

use std::sync::Arc;

use albmig_core::lab_controller::{LabControllerDetails, SetLabControllerDetails};
use albmig_core::migration::IncompleteMigrationsBatch;
use albmig_core::types::Timestamp;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::api::{ClientError, MigrationApi};

/// Result of the most recent live pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    NeverSynced,
    Synced { at: Timestamp },
    Failed { error: ClientError },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unconfigured,
    Configured {
        details: LabControllerDetails,
        sync: SyncStatus,
    },
}

impl SessionState {
    fn configured(details: LabControllerDetails) -> Self {
        let sync = match details.last_fetched_at {
            Some(at) => SyncStatus::Synced { at },
            None => SyncStatus::NeverSynced,
        };
        Self::Configured { details, sync }
    }
}

/// Owner of the lab controller record on the client side.
#[derive(Clone)]
pub struct LabControllerSession {
    api: Arc<dyn MigrationApi>,
    state: Arc<RwLock<SessionState>>,
}

impl LabControllerSession {
    pub fn new(api: Arc<dyn MigrationApi>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(SessionState::Unconfigured)),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Cached details; `None` until configured.
    pub async fn details(&self) -> Option<LabControllerDetails> {
        match &*self.state.read().await {
            SessionState::Unconfigured => None,
            SessionState::Configured { details, .. } => Some(details.clone()),
        }
    }

    /// Reload the details from the server.
    ///
    /// A recorded fetch failure survives the reload; it is only cleared by
    /// a successful fetch or new details. On error the cached state is kept.
    pub async fn refresh_details(&self) -> Result<Option<LabControllerDetails>, ClientError> {
        let fetched = self.api.lab_controller().await?;

        let mut state = self.state.write().await;
        let next = match (&fetched, &*state) {
            (None, _) => SessionState::Unconfigured,
            (
                Some(details),
                SessionState::Configured {
                    sync: SyncStatus::Failed { error },
                    ..
                },
            ) => SessionState::Configured {
                details: details.clone(),
                sync: SyncStatus::Failed {
                    error: error.clone(),
                },
            },
            (Some(details), _) => SessionState::configured(details.clone()),
        };
        *state = next;
        Ok(fetched)
    }

    /// Overwrite the details. Reachability is only checked by a live pull.
    pub async fn set_details(
        &self,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerDetails, ClientError> {
        let details = self.api.set_lab_controller(input).await?;
        tracing::info!(host = %details.host, "Lab controller details updated");

        *self.state.write().await = SessionState::Configured {
            details: details.clone(),
            sync: SyncStatus::NeverSynced,
        };
        Ok(details)
    }

    /// Pull virtual services from the controller and return the refreshed
    /// worklist.
    ///
    /// Fails with [`ClientError::NotConfigured`] before any details exist.
    /// On failure the details are left untouched and the error is recorded.
    pub async fn fetch_from_controller(&self) -> Result<IncompleteMigrationsBatch, ClientError> {
        if matches!(*self.state.read().await, SessionState::Unconfigured) {
            return Err(ClientError::NotConfigured);
        }

        match self.api.fetch_from_controller().await {
            Ok(batch) => {
                let refreshed = match self.api.lab_controller().await {
                    Ok(details) => details,
                    Err(err) => {
                        tracing::warn!(error = %err, "Could not reload lab controller after fetch");
                        None
                    }
                };
                let at = refreshed
                    .as_ref()
                    .and_then(|d| d.last_fetched_at)
                    .unwrap_or_else(Utc::now);

                let mut state = self.state.write().await;
                if let SessionState::Configured { details, sync } = &mut *state {
                    match refreshed {
                        Some(server) => *details = server,
                        None => details.last_fetched_at = Some(at),
                    }
                    *sync = SyncStatus::Synced { at };
                }
                tracing::info!(items = batch.len(), "Fetched from lab controller");
                Ok(batch)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                if let SessionState::Configured { sync, .. } = &mut *state {
                    *sync = SyncStatus::Failed { error: err.clone() };
                }
                Err(err)
            }
        }
    }
}
