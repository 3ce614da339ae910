//! Route definitions for migration configuration and the lab controller.
//!
//! Mounted at `/configuration` by `api_routes()`.
//!
//! ```text
//! GET    /overview                     get_overview
//! GET    /incomplete-migrations        get_incomplete_migrations
//! GET    /lab-controller               get_lab_controller
//! POST   /lab-controller               set_lab_controller
//! POST   /fetch-from-controller        fetch_from_controller
//! POST   /accept-configuration         accept_configuration
//! POST   /skip-migration               skip_migration
//! POST   /start-migration              start_migration
//! POST   /generate-configuration       generate_configuration
//! GET    /conversion-status            get_conversion_status
//! GET    /avi-output                   get_avi_output
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{configuration, lab_controller};
use crate::state::AppState;

/// Configuration routes, mounted at `/configuration`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(configuration::get_overview))
        .route(
            "/incomplete-migrations",
            get(configuration::get_incomplete_migrations),
        )
        .route(
            "/lab-controller",
            get(lab_controller::get_lab_controller).post(lab_controller::set_lab_controller),
        )
        .route(
            "/fetch-from-controller",
            post(lab_controller::fetch_from_controller),
        )
        .route(
            "/accept-configuration",
            post(configuration::accept_configuration),
        )
        .route("/skip-migration", post(configuration::skip_migration))
        .route("/start-migration", post(configuration::start_migration))
        .route(
            "/generate-configuration",
            post(configuration::generate_configuration),
        )
        .route(
            "/conversion-status",
            get(configuration::get_conversion_status),
        )
        .route("/avi-output", get(configuration::get_avi_output))
}
