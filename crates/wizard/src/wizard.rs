//! Sequencing of operator review over the incomplete-migration worklist.
//!
//! The wizard never fails: every error from the components below becomes an
//! [`Alert`] and the state from before the failed call is kept. Retrying is
//! always up to the operator.
//!
//! The selected index refers to a position in the last fetched batch. A
//! refresh that shrinks the batch does not move it; an index at or past the
//! end reads as [`Position::AllReviewed`].

use std::sync::Arc;

use albmig_core::migration::{MigrationStatus, VirtualServiceMigration};
use albmig_core::overview::MigrationOverview;

use crate::alert::{Alert, AlertCenter, AlertId, AlertLevel};
use crate::api::{ClientError, MigrationApi};
use crate::overview::OverviewProvider;
use crate::session::LabControllerSession;
use crate::tracker::{IncompleteMigrationTracker, Refresh};

/// What `skip` does at the end of the worklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SkipPolicy {
    /// Stop at `len(items)`, the "all reviewed" position.
    #[default]
    ClampAtEnd,
    /// Keep counting past the end.
    Unbounded,
}

/// Where the wizard stands in the worklist.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    At {
        index: usize,
        item: VirtualServiceMigration,
    },
    AllReviewed,
}

/// How the configuration editor was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Saved { avi_ref: Option<String> },
    Cancelled,
}

/// Event for the presentation layer, returned by the operation that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A live pull replaced the worklist.
    ControllerSynced {
        incomplete: usize,
        completed_count: i64,
    },
}

pub struct MigrationWizard {
    tracker: IncompleteMigrationTracker,
    overview: OverviewProvider,
    session: LabControllerSession,
    policy: SkipPolicy,
    selected_index: usize,
    editor_open: bool,
    controller_edit_open: bool,
    last_overview: Option<MigrationOverview>,
    alerts: AlertCenter,
}

impl MigrationWizard {
    pub fn new(api: Arc<dyn MigrationApi>) -> Self {
        Self::with_policy(api, SkipPolicy::default())
    }

    pub fn with_policy(api: Arc<dyn MigrationApi>, policy: SkipPolicy) -> Self {
        Self {
            tracker: IncompleteMigrationTracker::new(api.clone()),
            overview: OverviewProvider::new(api.clone()),
            session: LabControllerSession::new(api),
            policy,
            selected_index: 0,
            editor_open: false,
            controller_edit_open: false,
            last_overview: None,
            alerts: AlertCenter::default(),
        }
    }

    // ---- accessors ----

    pub fn tracker(&self) -> &IncompleteMigrationTracker {
        &self.tracker
    }

    pub fn session(&self) -> &LabControllerSession {
        &self.session
    }

    pub fn policy(&self) -> SkipPolicy {
        self.policy
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn editor_open(&self) -> bool {
        self.editor_open
    }

    pub fn controller_edit_open(&self) -> bool {
        self.controller_edit_open
    }

    /// The overview from the last successful refresh.
    pub fn overview(&self) -> Option<MigrationOverview> {
        self.last_overview
    }

    pub fn alerts(&self) -> &[Alert] {
        self.alerts.alerts()
    }

    pub fn dismiss_alert(&mut self, id: AlertId) -> bool {
        self.alerts.dismiss(id)
    }

    pub async fn position(&self) -> Position {
        match self.tracker.item(self.selected_index).await {
            Some(item) => Position::At {
                index: self.selected_index,
                item,
            },
            None => Position::AllReviewed,
        }
    }

    // ---- operations ----

    /// Load the worklist, the lab controller details and the overview.
    ///
    /// Each part reports its own failure; the others still load. The index
    /// returns to the start only when the fetched worklist is adopted.
    pub async fn load(&mut self) {
        match self.tracker.fetch_incomplete().await {
            Ok(Refresh::Applied) => self.selected_index = 0,
            Ok(Refresh::Discarded) => {
                tracing::debug!("Worklist replaced while loading; keeping position");
            }
            Err(err) => {
                self.alerts
                    .push(AlertLevel::Error, "Loading incomplete migrations", err);
            }
        }
        if let Err(err) = self.session.refresh_details().await {
            self.alerts
                .push(AlertLevel::Error, "Loading lab controller details", err);
        }
        self.refresh_overview().await;
    }

    pub async fn refresh_overview(&mut self) {
        match self.overview.get_overview().await {
            Ok(overview) => self.last_overview = Some(overview),
            Err(err) => {
                self.alerts
                    .push(AlertLevel::Error, "Loading migration overview", err);
            }
        }
    }

    /// Move to the next virtual service without changing any status.
    pub async fn skip(&mut self) -> usize {
        self.advance().await;
        self.selected_index
    }

    /// Open the editor on the selected virtual service.
    ///
    /// Does not move the index. Marking the item as in review is best
    /// effort: a failure is reported but the editor stays open. Returns
    /// `None` at the end of the worklist.
    pub async fn start(&mut self) -> Option<VirtualServiceMigration> {
        let Position::At { item, .. } = self.position().await else {
            return None;
        };
        self.editor_open = true;

        if item.status != MigrationStatus::Completed {
            if let Err(err) = self.tracker.mark_in_review(item.id).await {
                self.alerts
                    .push(AlertLevel::Warning, "Marking migration as in review", err);
            }
        }
        Some(item)
    }

    /// Close the editor. Saving marks the item completed and advances; if
    /// that fails the editor stays open so the operator can retry.
    pub async fn close_editor(&mut self, outcome: EditorOutcome) {
        if !self.editor_open {
            return;
        }
        let avi_ref = match outcome {
            EditorOutcome::Cancelled => {
                self.editor_open = false;
                return;
            }
            EditorOutcome::Saved { avi_ref } => avi_ref,
        };

        let Position::At { item, .. } = self.position().await else {
            self.editor_open = false;
            return;
        };

        match self
            .tracker
            .mark_completed(item.id, avi_ref.as_deref())
            .await
        {
            Ok(()) => {
                self.editor_open = false;
                self.advance().await;
                self.refresh_overview().await;
            }
            Err(err) => {
                self.alerts
                    .push(AlertLevel::Error, "Accepting configuration", err);
            }
        }
    }

    pub fn edit_lab_controller(&mut self) {
        self.controller_edit_open = true;
    }

    /// Close the lab controller editor, reloading the session details only
    /// when the operator changed them.
    pub async fn close_lab_controller_edit(&mut self, details_changed: bool) {
        self.controller_edit_open = false;
        if !details_changed {
            return;
        }
        if let Err(err) = self.session.refresh_details().await {
            self.alerts
                .push(AlertLevel::Error, "Loading lab controller details", err);
        }
    }

    /// Live pull from the lab controller.
    ///
    /// On success the worklist is replaced and the overview refreshed; the
    /// selected index is kept as is. Without configured details the lab
    /// controller editor is opened instead.
    pub async fn fetch_from_controller(&mut self) -> Option<Notification> {
        match self.session.fetch_from_controller().await {
            Ok(batch) => {
                let notification = Notification::ControllerSynced {
                    incomplete: batch.len(),
                    completed_count: batch.completed_count,
                };
                self.tracker.replace(batch).await;
                self.refresh_overview().await;
                Some(notification)
            }
            Err(ClientError::NotConfigured) => {
                self.alerts.push(
                    AlertLevel::Warning,
                    "Fetching from lab controller",
                    ClientError::NotConfigured,
                );
                self.controller_edit_open = true;
                None
            }
            Err(err) => {
                self.alerts
                    .push(AlertLevel::Error, "Fetching from lab controller", err);
                None
            }
        }
    }

    /// Leave the wizard: results of requests still in flight are dropped.
    pub async fn teardown(&mut self) {
        self.tracker.invalidate().await;
        self.editor_open = false;
        self.controller_edit_open = false;
        self.alerts.clear();
    }

    async fn advance(&mut self) {
        match self.policy {
            SkipPolicy::ClampAtEnd => {
                if self.selected_index < self.tracker.len().await {
                    self.selected_index += 1;
                }
            }
            SkipPolicy::Unbounded => self.selected_index += 1,
        }
    }
}
