use std::sync::Arc;

use albmig_db::ConfigurationStore;

use crate::config::ServerConfig;
use crate::controller::{ControllerClient, SecretSource};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Configuration Store (PostgreSQL or in-memory).
    pub store: Arc<dyn ConfigurationStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Client for the live F5 controller.
    pub controller: Arc<dyn ControllerClient>,
    /// Resolves lab controller credential references to passwords.
    pub secrets: Arc<dyn SecretSource>,
}
