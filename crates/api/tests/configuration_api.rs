//! HTTP-level integration tests for migration review under `/configuration`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, import_run, incomplete_ids, post_json};
use serde_json::json;

async fn overview(app: &common::TestApp) -> serde_json::Value {
    let response = get(app.router(), "/api/configuration/overview").await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overview_without_run_is_all_zero() {
    let app = build_test_app();
    let data = overview(&app).await;

    assert_eq!(data["totalCount"], 0);
    assert_eq!(data["completedCount"], 0);
    assert_eq!(data["incompleteCount"], 0);
    assert_eq!(data["skippedCount"], 0);
}

#[tokio::test]
async fn overview_tracks_status_changes() {
    let app = build_test_app();
    import_run(&app, "lab", &["a", "b", "c", "d"]).await;
    let ids = incomplete_ids(&app).await;

    post_json(
        app.router(),
        "/api/configuration/accept-configuration",
        json!({ "id": ids[0], "aviRef": "vs-a" }),
    )
    .await;
    post_json(
        app.router(),
        "/api/configuration/skip-migration",
        json!({ "id": ids[1] }),
    )
    .await;
    post_json(
        app.router(),
        "/api/configuration/start-migration",
        json!({ "id": ids[2] }),
    )
    .await;

    let data = overview(&app).await;
    assert_eq!(data["totalCount"], 4);
    assert_eq!(data["completedCount"], 1);
    assert_eq!(data["incompleteCount"], 2);
    assert_eq!(data["skippedCount"], 1);
}

// ---------------------------------------------------------------------------
// Incomplete migrations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn incomplete_without_run_is_empty_batch() {
    let app = build_test_app();
    let response = get(app.router(), "/api/configuration/incomplete-migrations").await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert!(data["runId"].is_null());
    assert!(data["items"].as_array().unwrap().is_empty());
    assert_eq!(data["completedCount"], 0);
}

#[tokio::test]
async fn completed_leaves_batch_but_skipped_stays() {
    let app = build_test_app();
    import_run(&app, "lab", &["a", "b", "c"]).await;
    let ids = incomplete_ids(&app).await;

    post_json(
        app.router(),
        "/api/configuration/accept-configuration",
        json!({ "id": ids[1] }),
    )
    .await;
    post_json(
        app.router(),
        "/api/configuration/skip-migration",
        json!({ "id": ids[2] }),
    )
    .await;

    let response = get(app.router(), "/api/configuration/incomplete-migrations").await;
    let data = &body_json(response).await["data"];
    let items = data["items"].as_array().unwrap();

    assert_eq!(data["completedCount"], 1);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], ids[0]);
    assert_eq!(items[1]["id"], ids[2]);
    assert_eq!(items[1]["status"], "skipped");
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accept_records_avi_ref() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;
    let id = incomplete_ids(&app).await[0];

    let response = post_json(
        app.router(),
        "/api/configuration/accept-configuration",
        json!({ "id": id, "aviRef": "  web-vs  " }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["status"], "completed");
    assert_eq!(data["aviRef"], "web-vs");
}

#[tokio::test]
async fn accept_twice_is_idempotent() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;
    let id = incomplete_ids(&app).await[0];

    for _ in 0..2 {
        let response = post_json(
            app.router(),
            "/api/configuration/accept-configuration",
            json!({ "id": id }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(overview(&app).await["completedCount"], 1);
}

#[tokio::test]
async fn completed_cannot_be_skipped() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;
    let id = incomplete_ids(&app).await[0];

    post_json(
        app.router(),
        "/api/configuration/accept-configuration",
        json!({ "id": id }),
    )
    .await;
    let response = post_json(
        app.router(),
        "/api/configuration/skip-migration",
        json!({ "id": id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn skipped_can_be_started_again() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;
    let id = incomplete_ids(&app).await[0];

    post_json(
        app.router(),
        "/api/configuration/skip-migration",
        json!({ "id": id }),
    )
    .await;
    let response = post_json(
        app.router(),
        "/api/configuration/start-migration",
        json!({ "id": id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "in_review");
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;

    let response = post_json(
        app.router(),
        "/api/configuration/accept-configuration",
        json!({ "id": 999_999 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;
    app.store.set_unavailable(true);

    let response = get(app.router(), "/api/configuration/overview").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "STORE_UNAVAILABLE");
}

// ---------------------------------------------------------------------------
// Converter documents
// ---------------------------------------------------------------------------

fn generated_payload() -> serde_json::Value {
    json!({
        "conversionStatus": {
            "statusSheet": { "virtual": { "web": "SUCCESSFUL" } },
            "pivotSheet": [],
            "iruleDiscovery": []
        },
        "aviOutput": {
            "body": { "VirtualService": [{ "name": "web" }], "Pool": [] }
        }
    })
}

#[tokio::test]
async fn generate_requires_a_run() {
    let app = build_test_app();
    let response = post_json(
        app.router(),
        "/api/configuration/generate-configuration",
        generated_payload(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn generate_then_read_latest_documents() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;

    let response = get(app.router(), "/api/configuration/conversion-status").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        app.router(),
        "/api/configuration/generate-configuration",
        generated_payload(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(app.router(), "/api/configuration/conversion-status").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = &body_json(response).await["data"];
    assert_eq!(doc["schemaVersion"], 1);
    assert_eq!(doc["statusSheet"]["virtual"]["web"], "SUCCESSFUL");

    let response = get(app.router(), "/api/configuration/avi-output").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = &body_json(response).await["data"];
    assert_eq!(doc["body"]["VirtualService"][0]["name"], "web");
}

#[tokio::test]
async fn generate_rejects_unknown_avi_type() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;

    let mut payload = generated_payload();
    payload["aviOutput"]["body"]["GslbService"] = json!([]);
    let response = post_json(
        app.router(),
        "/api/configuration/generate-configuration",
        payload,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
