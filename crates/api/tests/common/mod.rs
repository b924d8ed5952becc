#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use instabids_api::config::{LogFormat, ServerConfig};
use instabids_api::mock::MockBidCards;
use instabids_api::router::build_app_router;
use instabids_api::state::AppState;
use instabids_core::memory::{InMemoryBidCards, InMemoryMedia, InMemoryMessages, InMemoryTables};
use instabids_core::services::{BidCardService, MessageService};
use instabids_storage::MediaStorageConfig;

pub const BOUNDARY: &str = "instabids-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(mock_bid_cards: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 10 * 1024 * 1024,
        log_format: LogFormat::Pretty,
        mock_bid_cards,
        database_url: "postgres://unused".to_string(),
        media: MediaStorageConfig::Local {
            root: std::env::temp_dir().join("instabids-test-media"),
            public_base_url: "http://localhost:3000/media".to_string(),
        },
    }
}

/// The collaborators behind a test app, kept so tests can inspect them.
pub struct TestApp {
    pub app: Router,
    pub bid_cards: Arc<InMemoryBidCards>,
    pub media: Arc<InMemoryMedia>,
    pub messages: Arc<InMemoryMessages>,
    pub tables: Arc<InMemoryTables>,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(InMemoryBidCards::default(), InMemoryMedia::default(), false)
}

/// Build the full application router on in-memory collaborators. It runs
/// the same middleware stack as production.
pub fn build_test_app_with(
    bid_cards: InMemoryBidCards,
    media: InMemoryMedia,
    mock_bid_cards: bool,
) -> TestApp {
    let config = test_config(mock_bid_cards);
    let bid_cards = Arc::new(bid_cards);
    let media = Arc::new(media);
    let messages = Arc::new(InMemoryMessages::default());
    let tables = Arc::new(InMemoryTables::default());

    let state = AppState {
        config: Arc::new(config.clone()),
        bid_cards: BidCardService::new(bid_cards.clone(), media.clone()),
        messages: MessageService::new(messages.clone()),
        admin: tables.clone(),
        mock: mock_bid_cards.then(MockBidCards::new),
        pool: None,
    };

    TestApp {
        app: build_app_router(state, &config),
        bid_cards,
        media,
        messages,
        tables,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_as(app: &Router, uri: &str, user: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("x-user-id", user)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: &Value,
    user: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn multipart_request(
    app: &Router,
    method: Method,
    uri: &str,
    form: MultipartForm,
    user: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    send(app, builder.body(Body::from(form.finish())).unwrap()).await
}

/// Hand-assembled multipart body.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn json(self, name: &str, value: &Value) -> Self {
        self.text(name, &value.to_string())
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
