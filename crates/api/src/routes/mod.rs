pub mod configuration;
pub mod discovery;
pub mod health;
pub mod playbook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /configuration/overview                      migration counts (GET)
/// /configuration/incomplete-migrations         review worklist (GET)
/// /configuration/lab-controller                get, set (GET, POST)
/// /configuration/fetch-from-controller         live pull + merge (POST)
/// /configuration/accept-configuration          mark completed (POST)
/// /configuration/skip-migration                mark skipped (POST)
/// /configuration/start-migration               mark in review (POST)
/// /configuration/generate-configuration        store converter output (POST)
/// /configuration/conversion-status             latest conversion status (GET)
/// /configuration/avi-output                    latest Avi output (GET)
///
/// /discovery/import                            new run from discovery (POST)
/// /discovery/report                            virtual service breakdown (GET)
/// /discovery/download-report                   raw discovery data file (GET)
///
/// /playbook/generate-playbook                  playbook from Avi output (POST)
/// /playbook/playbooks                          current run's playbooks (GET)
/// /playbook/download-playbook/{id}             playbook file (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/configuration", configuration::router())
        .nest("/discovery", discovery::router())
        .nest("/playbook", playbook::router())
}
