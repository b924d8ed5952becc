//! Router tests for contractor lists and message threads.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use common::{body_json, build_test_app, get, get_as, json_request};
use instabids_core::bid_card::ContractorBidStatus;
use instabids_core::messaging::{ContractorSummary, Message};
use instabids_core::types::EntityId;

const PROJECT: &str = "00000000-0000-0000-0000-000000000001";
const CONTRACTOR: &str = "00000000-0000-0000-0000-000000000002";
const HOMEOWNER: &str = "00000000-0000-0000-0000-0000000000aa";

fn thread_uri() -> String {
    format!("/api/projects/{PROJECT}/contractors/{CONTRACTOR}/messages")
}

fn seeded(sender: u128, content: &str, minute: i64, metadata: serde_json::Value) -> Message {
    Message {
        id: EntityId::from_u128(1000 + minute as u128),
        project_id: EntityId::parse_str(PROJECT).unwrap(),
        contractor_id: EntityId::parse_str(CONTRACTOR).unwrap(),
        sender_id: EntityId::from_u128(sender),
        content: content.into(),
        timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minute),
        attachments: vec![],
        metadata,
    }
}

#[tokio::test]
async fn thread_labels_contractors_for_the_viewer() {
    let t = build_test_app();
    let homeowner = EntityId::parse_str(HOMEOWNER).unwrap().as_u128();
    // Seeded out of order; the thread comes back by timestamp.
    t.messages.seed(seeded(0x20, "I can start Monday", 2, json!({}))).await;
    t.messages.seed(seeded(homeowner, "When can you start?", 1, json!({}))).await;
    t.messages.seed(seeded(0x30, "Second opinion here", 3, json!({}))).await;
    t.messages.seed(seeded(0x20, "Quote attached", 4, json!({}))).await;

    let response = get_as(&t.app, &thread_uri(), HOMEOWNER).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let thread = json["data"].as_array().unwrap();
    assert_eq!(thread.len(), 4);
    assert_eq!(thread[0]["isOwn"], true);
    assert!(thread[0]["senderAlias"].is_null());
    assert_eq!(thread[1]["senderAlias"], "Contractor A");
    assert_eq!(thread[2]["senderAlias"], "Contractor B");
    assert_eq!(thread[3]["senderAlias"], "Contractor A");
    assert_eq!(thread[3]["senderLabel"], "1");
}

#[tokio::test]
async fn thread_requires_caller_identity() {
    let t = build_test_app();
    let response = get(&t.app, &thread_uri()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_identity_is_rejected() {
    let t = build_test_app();
    let response = get_as(&t.app, &thread_uri(), "not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn send_then_read_back() {
    let t = build_test_app();
    let body = json!({
        "content": "  Can you include permit fees?  ",
        "attachments": [{ "filename": "plan.pdf", "url": "https://media.example.com/plan.pdf" }],
    });

    let response = json_request(&t.app, Method::POST, &thread_uri(), &body, Some(HOMEOWNER)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let sent = body_json(response).await;
    assert_eq!(sent["data"]["content"], "Can you include permit fees?");
    assert_eq!(sent["data"]["senderId"], HOMEOWNER);
    assert_eq!(sent["data"]["metadata"], json!({}));

    let thread = body_json(get_as(&t.app, &thread_uri(), HOMEOWNER).await).await;
    assert_eq!(thread["data"].as_array().unwrap().len(), 1);
    assert_eq!(thread["data"][0]["isOwn"], true);
}

#[tokio::test]
async fn blank_message_is_a_field_error() {
    let t = build_test_app();
    let response = json_request(
        &t.app,
        Method::POST,
        &thread_uri(),
        &json!({ "content": "   " }),
        Some(HOMEOWNER),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["fields"][0]["field"], "content");
}

#[tokio::test]
async fn mistyped_message_body_is_json_400() {
    let t = build_test_app();
    let response = json_request(
        &t.app,
        Method::POST,
        &thread_uri(),
        &json!({ "content": 42 }),
        Some(HOMEOWNER),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_project_id_is_json_400() {
    let t = build_test_app();
    let response = get(&t.app, "/api/projects/nope/contractors").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn contractors_for_a_project() {
    let t = build_test_app();
    t.messages
        .add_contractor(
            EntityId::parse_str(PROJECT).unwrap(),
            ContractorSummary {
                id: EntityId::parse_str(CONTRACTOR).unwrap(),
                name: "Sam Rivera".into(),
                company: Some("Rivera Decks".into()),
                bid_amount: Some(10_500.0),
                status: ContractorBidStatus::Pending,
            },
        )
        .await;

    let response = get(&t.app, &format!("/api/projects/{PROJECT}/contractors")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["name"], "Sam Rivera");
    assert_eq!(json["data"][0]["bidAmount"], 10_500.0);
    assert_eq!(json["data"][0]["status"], "pending");
}
