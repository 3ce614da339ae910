//! Client side of the migration wizard.
//!
//! The components here hold the operator's view of a migration run and talk
//! to the API server through the [`MigrationApi`] seam:
//!
//! - [`IncompleteMigrationTracker`]: the ordered review worklist.
//! - [`OverviewProvider`]: dashboard counts, fetched on every call.
//! - [`LabControllerSession`]: lab controller details and live pulls.
//! - [`MigrationWizard`]: sequences review over the worklist and turns
//!   every failure into a dismissible alert.

pub mod alert;
pub mod api;
pub mod http;
pub mod overview;
pub mod session;
pub mod tracker;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use alert::{Alert, AlertCenter, AlertId, AlertLevel};
pub use api::{ClientError, MigrationApi};
pub use http::{ClientConfig, HttpMigrationApi};
pub use overview::OverviewProvider;
pub use session::{LabControllerSession, SessionState, SyncStatus};
pub use tracker::{IncompleteMigrationTracker, Refresh};
pub use wizard::{EditorOutcome, MigrationWizard, Notification, Position, SkipPolicy};
