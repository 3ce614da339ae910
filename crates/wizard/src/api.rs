//! The seam between wizard components and the API server.

use albmig_core::lab_controller::{LabControllerDetails, SetLabControllerDetails};
use albmig_core::migration::{IncompleteMigrationsBatch, VirtualServiceMigration};
use albmig_core::overview::MigrationOverview;
use albmig_core::types::DbId;
use async_trait::async_trait;

/// Errors surfaced to wizard components.
///
/// Every variant is recoverable; retries are always operator-initiated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The API server or its Configuration Store cannot be reached.
    #[error("Configuration store unavailable: {0}")]
    StoreUnavailable(String),

    /// The live pull could not reach the lab controller.
    #[error("Lab controller unreachable: {0}")]
    ControllerUnreachable(String),

    /// The lab controller rejected the configured credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested transition is not allowed (e.g. leaving `completed`).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A live pull was requested before any lab controller was configured.
    #[error("No lab controller configured")]
    NotConfigured,

    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl ClientError {
    /// Classify a non-2xx response from its status and `code` field.
    ///
    /// The error code wins when present; otherwise the status decides, with
    /// any other 5xx treated as a store outage.
    pub fn from_status(status: u16, code: Option<&str>, message: String) -> Self {
        match code {
            Some("STORE_UNAVAILABLE") => return Self::StoreUnavailable(message),
            Some("CONTROLLER_UNREACHABLE") => return Self::ControllerUnreachable(message),
            Some("UNAUTHORIZED") => return Self::Unauthorized(message),
            Some("VALIDATION_ERROR") => return Self::Validation(message),
            Some("NOT_FOUND") => return Self::NotFound(message),
            Some("CONFLICT") => return Self::Conflict(message),
            _ => {}
        }
        match status {
            400 | 422 => Self::Validation(message),
            401 | 403 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            502 | 504 => Self::ControllerUnreachable(message),
            500..=599 => Self::StoreUnavailable(message),
            _ => Self::Unexpected { status, message },
        }
    }
}

/// Operations the wizard needs from the API server.
#[async_trait]
pub trait MigrationApi: Send + Sync {
    async fn overview(&self) -> Result<MigrationOverview, ClientError>;

    async fn incomplete_migrations(&self) -> Result<IncompleteMigrationsBatch, ClientError>;

    /// The lab controller record; `None` when none has been configured.
    async fn lab_controller(&self) -> Result<Option<LabControllerDetails>, ClientError>;

    async fn set_lab_controller(
        &self,
        input: &SetLabControllerDetails,
    ) -> Result<LabControllerDetails, ClientError>;

    /// Live pull and merge; returns the refreshed worklist.
    async fn fetch_from_controller(&self) -> Result<IncompleteMigrationsBatch, ClientError>;

    async fn accept_configuration(
        &self,
        id: DbId,
        avi_ref: Option<&str>,
    ) -> Result<VirtualServiceMigration, ClientError>;

    async fn skip_migration(&self, id: DbId) -> Result<VirtualServiceMigration, ClientError>;

    async fn start_migration(&self, id: DbId) -> Result<VirtualServiceMigration, ClientError>;
}
