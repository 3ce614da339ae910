#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use albmig_api::config::{ControllerConfig, ServerConfig, StoreBackend};
use albmig_api::controller::{ControllerClient, ControllerError, ControllerTarget};
use albmig_api::router::build_app_router;
use albmig_api::state::AppState;
use albmig_core::migration::DiscoveredVirtualService;
use albmig_db::{ConfigurationStore, MemoryStore};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Name of the credentials reference the test secret source resolves.
pub const TEST_CREDENTIALS_REF: &str = "F5_LAB_PASSWORD";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        store_backend: StoreBackend::Memory,
        controller: ControllerConfig::default(),
    }
}

// ---------------------------------------------------------------------------
// Scripted lab controller
// ---------------------------------------------------------------------------

/// What the scripted controller answers with on the next call.
#[derive(Debug, Clone)]
pub enum Script {
    Inventory(Vec<DiscoveredVirtualService>),
    RejectCredentials,
    Down,
}

/// [`ControllerClient`] that replays a scripted answer and records targets.
pub struct ScriptedController {
    script: Mutex<Script>,
    calls: Mutex<Vec<ControllerTarget>>,
}

impl ScriptedController {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn calls(&self) -> Vec<ControllerTarget> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControllerClient for ScriptedController {
    async fn list_virtual_services(
        &self,
        target: &ControllerTarget,
    ) -> Result<Vec<DiscoveredVirtualService>, ControllerError> {
        self.calls.lock().unwrap().push(target.clone());
        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Inventory(items) => Ok(items),
            Script::RejectCredentials => Err(ControllerError::Unauthorized {
                host: target.host.clone(),
            }),
            Script::Down => Err(ControllerError::Status {
                host: target.host.clone(),
                status: 503,
                body: "service unavailable".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

/// Router plus handles on the fakes behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub controller: Arc<ScriptedController>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over an in-memory store, a scripted
/// controller returning an empty inventory, and a secret source that knows
/// [`TEST_CREDENTIALS_REF`].
pub fn build_test_app() -> TestApp {
    build_test_app_with(Script::Inventory(Vec::new()))
}

pub fn build_test_app_with(script: Script) -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let controller = Arc::new(ScriptedController::new(script));
    let secrets: HashMap<String, String> =
        [(TEST_CREDENTIALS_REF.to_string(), "lab-secret".to_string())].into();

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        controller: controller.clone(),
        secrets: Arc::new(secrets),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        controller,
    }
}

/// Router over an arbitrary store, with an empty controller inventory.
pub fn build_router_with_store(store: Arc<dyn ConfigurationStore>) -> Router {
    let config = test_config();
    let secrets: HashMap<String, String> =
        [(TEST_CREDENTIALS_REF.to_string(), "lab-secret".to_string())].into();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        controller: Arc::new(ScriptedController::new(Script::Inventory(Vec::new()))),
        secrets: Arc::new(secrets),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Import a run of `/Common/<name>` standard virtual services.
pub async fn import_run(app: &TestApp, label: &str, names: &[&str]) -> Value {
    let services: Vec<Value> = names
        .iter()
        .map(|n| {
            serde_json::json!({
                "name": n,
                "f5Ref": format!("/Common/{n}"),
                "vsType": "standard",
            })
        })
        .collect();
    let response = post_json(
        app.router(),
        "/api/discovery/import",
        serde_json::json!({ "label": label, "virtualServices": services }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}

/// The ids of the current incomplete batch, in order.
pub async fn incomplete_ids(app: &TestApp) -> Vec<i64> {
    let response = get(app.router(), "/api/configuration/incomplete-migrations").await;
    assert_eq!(response.status(), 200);
    body_json(response).await["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}
