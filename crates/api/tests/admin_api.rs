//! Router tests for the admin database passthrough.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};

use common::{body_json, build_test_app, get, json_request, send};

async fn call(app: &axum::Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = json_request(app, method, uri, &body, None).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn create_tasks_table(app: &axum::Router) {
    let (status, json) = call(
        app,
        Method::POST,
        "/api/admin/db/table",
        json!({
            "tableName": "tasks",
            "columns": [
                { "name": "id", "type": "serial", "primaryKey": true },
                { "name": "label", "type": "text", "nullable": false },
                { "name": "done", "type": "boolean" }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Table 'tasks' created");
}

#[tokio::test]
async fn record_crud_round_trip() {
    let t = build_test_app();
    create_tasks_table(&t.app).await;

    for label in ["paint", "sand", "seal"] {
        let (status, json) = call(
            &t.app,
            Method::POST,
            "/api/admin/db/records",
            json!({ "table": "tasks", "data": { "label": label, "done": false } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["label"], label);
    }

    let (status, json) = call(
        &t.app,
        Method::PUT,
        "/api/admin/db/records",
        json!({ "table": "tasks", "data": { "done": true }, "filters": { "label": "sand" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["done"], true);

    let (status, json) = call(
        &t.app,
        Method::DELETE,
        "/api/admin/db/records",
        json!({ "table": "tasks", "filters": { "id": 1 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["label"], "paint");

    let response = get(&t.app, "/api/admin/db/table?name=tasks&columns=label,done&orderBy=label.desc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"],
        json!([{ "label": "seal", "done": false }, { "label": "sand", "done": true }])
    );
}

#[tokio::test]
async fn select_honours_limit_and_offset() {
    let t = build_test_app();
    create_tasks_table(&t.app).await;
    for label in ["a", "b", "c", "d"] {
        call(
            &t.app,
            Method::POST,
            "/api/admin/db/records",
            json!({ "table": "tasks", "data": { "label": label } }),
        )
        .await;
    }

    let json = body_json(get(&t.app, "/api/admin/db/table?name=tasks&columns=label&orderBy=id&limit=2&offset=1").await).await;
    assert_eq!(json["data"], json!([{ "label": "b" }, { "label": "c" }]));
}

#[tokio::test]
async fn missing_parameters_are_400() {
    let t = build_test_app();

    let (status, json) = call(
        &t.app,
        Method::POST,
        "/api/admin/db/records",
        json!({ "data": { "label": "x" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required parameter 'table'");

    let (status, _) = call(
        &t.app,
        Method::DELETE,
        "/api/admin/db/records",
        json!({ "table": "tasks" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &t.app,
        Method::PUT,
        "/api/admin/db/records",
        json!({ "table": "tasks", "data": { "done": true }, "filters": {} }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = get(&t.app, "/api/admin/db/table").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsafe_identifiers_are_400() {
    let t = build_test_app();

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/api/admin/db/records",
        json!({ "table": "tasks; DROP TABLE bid_cards", "data": { "label": "x" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/api/admin/db/records",
        json!({ "table": "tasks", "data": { "label\" = 1 --": "x" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = get(&t.app, "/api/admin/db/table?name=pg_authid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn database_rejections_are_500_with_message() {
    let t = build_test_app();

    let (status, json) = call(
        &t.app,
        Method::POST,
        "/api/admin/db/records",
        json!({ "table": "nowhere", "data": { "label": "x" } }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "OPERATION_FAILED");
    assert_eq!(json["error"], "relation \"nowhere\" does not exist");

    create_tasks_table(&t.app).await;
    let (status, json) = call(
        &t.app,
        Method::POST,
        "/api/admin/db/records",
        json!({ "table": "tasks", "data": { "done": true } }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("not-null"));
}

#[tokio::test]
async fn duplicate_table_is_500() {
    let t = build_test_app();
    create_tasks_table(&t.app).await;

    let (status, json) = call(
        &t.app,
        Method::POST,
        "/api/admin/db/table",
        json!({ "tableName": "tasks", "columns": [{ "name": "id", "type": "integer" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "relation \"tasks\" already exists");
}

#[tokio::test]
async fn mistyped_body_is_json_400() {
    let t = build_test_app();

    let (status, json) = call(
        &t.app,
        Method::POST,
        "/api/admin/db/records",
        json!({ "table": 5, "data": { "a": 1 } }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("table"));
}

#[tokio::test]
async fn malformed_or_untyped_bodies_are_json_400() {
    let t = build_test_app();

    let malformed = Request::builder()
        .method(Method::PUT)
        .uri("/api/admin/db/records")
        .header("content-type", "application/json")
        .body(Body::from("{\"table\": "))
        .unwrap();
    let response = send(&t.app, malformed).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let no_content_type = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/db/table")
        .body(Body::from("{}"))
        .unwrap();
    let response = send(&t.app, no_content_type).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn bad_select_query_is_json_400() {
    let t = build_test_app();
    let response = get(&t.app, "/api/admin/db/table?name=tasks&limit=many").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
