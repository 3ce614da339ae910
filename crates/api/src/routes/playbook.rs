//! Route definitions for playbooks.
//!
//! Mounted at `/playbook` by `api_routes()`.
//!
//! ```text
//! POST   /generate-playbook            generate_playbook
//! GET    /playbooks                    list_playbooks
//! GET    /download-playbook/{id}       download_playbook
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::playbook;
use crate::state::AppState;

/// Playbook routes, mounted at `/playbook`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-playbook", post(playbook::generate_playbook))
        .route("/playbooks", get(playbook::list_playbooks))
        .route("/download-playbook/{id}", get(playbook::download_playbook))
}
