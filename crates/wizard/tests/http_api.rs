//! Drives the wizard through [`HttpMigrationApi`] against the real router,
//! served on an ephemeral port over the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use albmig_api::config::{ControllerConfig, ServerConfig, StoreBackend};
use albmig_api::controller::{ControllerClient, ControllerError, ControllerTarget};
use albmig_api::router::build_app_router;
use albmig_api::state::AppState;
use albmig_core::lab_controller::SetLabControllerDetails;
use albmig_core::migration::{DiscoveredVirtualService, MigrationStatus};
use albmig_db::{ConfigurationStore, MemoryStore};
use albmig_wizard::{
    ClientConfig, ClientError, EditorOutcome, HttpMigrationApi, MigrationApi, MigrationWizard,
    Notification, Position, SessionState,
};
use assert_matches::assert_matches;
use async_trait::async_trait;

const CREDENTIALS_REF: &str = "F5_LAB_PASSWORD";

/// Lab controller that always reports the same inventory.
struct StaticController(Vec<DiscoveredVirtualService>);

#[async_trait]
impl ControllerClient for StaticController {
    async fn list_virtual_services(
        &self,
        _target: &ControllerTarget,
    ) -> Result<Vec<DiscoveredVirtualService>, ControllerError> {
        Ok(self.0.clone())
    }
}

fn discovered(name: &str) -> DiscoveredVirtualService {
    DiscoveredVirtualService {
        name: name.to_string(),
        f5_ref: format!("/Common/{name}"),
        vs_type: Some("standard".to_string()),
    }
}

struct Server {
    store: Arc<MemoryStore>,
    api: Arc<HttpMigrationApi>,
}

async fn spawn_server(inventory: Vec<DiscoveredVirtualService>) -> Server {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        store_backend: StoreBackend::Memory,
        controller: ControllerConfig::default(),
    };
    let store = Arc::new(MemoryStore::new());
    let secrets: HashMap<String, String> =
        [(CREDENTIALS_REF.to_string(), "lab-secret".to_string())].into();
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        controller: Arc::new(StaticController(inventory)),
        secrets: Arc::new(secrets),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = HttpMigrationApi::new(&ClientConfig {
        base_url: format!("http://{addr}"),
        timeout_secs: 5,
    })
    .unwrap();

    Server {
        store,
        api: Arc::new(api),
    }
}

#[tokio::test]
async fn review_flow_over_http() {
    let server = spawn_server(Vec::new()).await;
    server
        .store
        .create_run("lab", &[discovered("A"), discovered("B"), discovered("C")])
        .await
        .unwrap();

    let mut wizard = MigrationWizard::new(server.api.clone());
    wizard.load().await;
    assert!(wizard.alerts().is_empty());
    assert_eq!(wizard.overview().unwrap().total_count, 3);
    assert_eq!(wizard.session().state().await, SessionState::Unconfigured);

    let item = wizard.start().await.unwrap();
    assert_eq!(item.name, "A");
    wizard
        .close_editor(EditorOutcome::Saved {
            avi_ref: Some("vs-a".into()),
        })
        .await;
    wizard.skip().await;

    assert_matches!(wizard.position().await, Position::At { index: 2, item } if item.name == "C");
    let overview = wizard.overview().unwrap();
    assert_eq!(overview.completed_count, 1);
    assert_eq!(overview.incomplete_count, 2);

    // A full refresh drops A from the worklist and counts it as completed.
    wizard.tracker().fetch_incomplete().await.unwrap();
    let batch = wizard.tracker().snapshot().await;
    let names: Vec<_> = batch.items.iter().map(|vs| vs.name.as_str()).collect();
    assert_eq!(names, ["B", "C"]);
    assert_eq!(batch.completed_count, 1);
    assert!(batch.completed_count + batch.items.len() as i64 <= overview.total_count);
}

#[tokio::test]
async fn mark_completed_is_idempotent_over_http() {
    let server = spawn_server(Vec::new()).await;
    server
        .store
        .create_run("lab", &[discovered("A")])
        .await
        .unwrap();
    let id = server.api.incomplete_migrations().await.unwrap().items[0].id;

    let first = server.api.accept_configuration(id, Some("vs-a")).await.unwrap();
    let second = server.api.accept_configuration(id, Some("vs-a")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.status, MigrationStatus::Completed);
    assert_eq!(server.api.overview().await.unwrap().completed_count, 1);
}

#[tokio::test]
async fn lab_controller_round_trip_and_live_fetch() {
    let server = spawn_server(vec![discovered("web"), discovered("api")]).await;
    let mut wizard = MigrationWizard::new(server.api.clone());
    wizard.load().await;

    assert_eq!(wizard.fetch_from_controller().await, None);
    assert!(wizard.controller_edit_open());

    let input = SetLabControllerDetails {
        host: "10.0.0.5".to_string(),
        username: "admin".to_string(),
        credentials_ref: CREDENTIALS_REF.to_string(),
    };
    let stored = wizard.session().set_details(&input).await.unwrap();
    wizard.close_lab_controller_edit(true).await;
    let loaded = wizard.session().details().await.unwrap();
    assert_eq!(
        (loaded.host.as_str(), loaded.username.as_str(), loaded.credentials_ref.as_str()),
        (input.host.as_str(), input.username.as_str(), input.credentials_ref.as_str())
    );
    assert_eq!(wizard.session().details().await, Some(stored));

    let notification = wizard.fetch_from_controller().await;
    assert_eq!(
        notification,
        Some(Notification::ControllerSynced {
            incomplete: 2,
            completed_count: 0,
        })
    );
    assert!(wizard
        .session()
        .details()
        .await
        .unwrap()
        .last_fetched_at
        .is_some());
    assert_eq!(wizard.overview().unwrap().total_count, 2);
}

#[tokio::test]
async fn error_codes_map_to_client_errors() {
    let server = spawn_server(Vec::new()).await;

    assert_eq!(server.api.lab_controller().await.unwrap(), None);

    let invalid = SetLabControllerDetails {
        host: "not a host!".to_string(),
        username: "admin".to_string(),
        credentials_ref: CREDENTIALS_REF.to_string(),
    };
    assert_matches!(
        server.api.set_lab_controller(&invalid).await,
        Err(ClientError::Validation(_))
    );

    assert_matches!(
        server.api.skip_migration(12345).await,
        Err(ClientError::NotFound(_))
    );

    server.store.set_unavailable(true);
    assert_matches!(
        server.api.incomplete_migrations().await,
        Err(ClientError::StoreUnavailable(_))
    );
}
