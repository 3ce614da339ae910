//! Route definitions for discovery.
//!
//! Mounted at `/discovery` by `api_routes()`.
//!
//! ```text
//! POST   /import                       import_discovery
//! GET    /report                       get_report
//! GET    /download-report              download_report
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::discovery;
use crate::state::AppState;

/// Discovery routes, mounted at `/discovery`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/import", post(discovery::import_discovery))
        .route("/report", get(discovery::get_report))
        .route("/download-report", get(discovery::download_report))
}
