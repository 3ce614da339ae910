//! HTTP-level integration tests for the `/playbook` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, import_run, post_json, TestApp};
use serde_json::{json, Value};

async fn generate_configuration(app: &TestApp) {
    let response = post_json(
        app.router(),
        "/api/configuration/generate-configuration",
        json!({
            "conversionStatus": {
                "statusSheet": { "virtual": { "web": "SUCCESSFUL" } },
                "pivotSheet": [],
                "iruleDiscovery": []
            },
            "aviOutput": {
                "body": {
                    "VirtualService": [{ "name": "web" }],
                    "Pool": [{ "name": "web-pool" }]
                }
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn generate_playbook(app: &TestApp, body: Value) -> Value {
    let response = post_json(app.router(), "/api/playbook/generate-playbook", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn generate_without_run_is_conflict() {
    let app = build_test_app();
    let response = post_json(app.router(), "/api/playbook/generate-playbook", json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn generate_without_avi_output_is_conflict() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;

    let response = post_json(app.router(), "/api/playbook/generate-playbook", json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn generate_builds_tasks_from_latest_avi_output() {
    let app = build_test_app();
    let imported = import_run(&app, "lab", &["web"]).await;
    generate_configuration(&app).await;

    let summary = generate_playbook(&app, json!({ "name": "lab cutover" })).await;
    assert_eq!(summary["name"], "lab cutover");
    assert_eq!(summary["taskCount"], 2);
    assert_eq!(summary["runId"], imported["run"]["id"]);
    assert!(summary.get("body").is_none(), "summaries omit the play");

    let unnamed = generate_playbook(&app, json!({})).await;
    assert_eq!(
        unnamed["name"],
        format!("avi-migration-run-{}", imported["run"]["id"])
    );

    let response = get(app.router(), "/api/playbook/playbooks").await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await["data"].clone();
    let ids: Vec<_> = listed.as_array().unwrap().iter().map(|p| p["id"].clone()).collect();
    assert_eq!(ids, [unnamed["id"].clone(), summary["id"].clone()]);
}

#[tokio::test]
async fn download_serves_play_as_attachment() {
    let app = build_test_app();
    import_run(&app, "lab", &["web"]).await;
    generate_configuration(&app).await;
    let summary = generate_playbook(&app, json!({ "name": "lab cutover" })).await;

    let uri = format!("/api/playbook/download-playbook/{}", summary["id"]);
    let response = get(app.router(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"lab_cutover.json\""
    );

    let play = body_json(response).await;
    let tasks = play[0]["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["avi_pool"], json!({ "name": "web-pool" }));
    assert_eq!(tasks[1]["avi_virtualservice"], json!({ "name": "web" }));
}

#[tokio::test]
async fn playbooks_are_scoped_to_current_run() {
    let app = build_test_app();

    let response = get(app.router(), "/api/playbook/playbooks").await;
    assert_eq!(body_json(response).await["data"], json!([]));

    import_run(&app, "first", &["web"]).await;
    generate_configuration(&app).await;
    generate_playbook(&app, json!({})).await;

    import_run(&app, "second", &["web"]).await;
    let response = get(app.router(), "/api/playbook/playbooks").await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[tokio::test]
async fn download_unknown_playbook_is_not_found() {
    let app = build_test_app();
    let response = get(app.router(), "/api/playbook/download-playbook/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}
