//! Shared fixtures for router tests: an in-memory backend with one signed-in
//! user and helpers that drive the full middleware stack.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{TimeZone, Utc};
use reading_server::reading_core::{Document, UserId, VocabularyEntry};
use reading_server::reading_store::{Backend, MemoryStore};
use reading_server::{build_app, AppState, ServerConfig};
use serde_json::Value;
use tower::ServiceExt;

pub const TOKEN: &str = "session-alice";
pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub app: Router,
}

impl TestApp {
    /// Fresh store with a session for [`ALICE`].
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        store.add_session(TOKEN, ALICE);
        let backend: Arc<dyn Backend> = store.clone();
        let config = ServerConfig {
            database_url: String::new(),
            ..ServerConfig::default()
        };
        let app = build_app(AppState::new(backend, config));
        Self { store, app }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(authed(Method::GET, uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.send(authed(Method::DELETE, uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.send(json_request(Method::POST, uri, &body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response {
        self.send(json_request(Method::PUT, uri, &body)).await
    }
}

pub fn authed(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    authed(method, uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

/// Status plus parsed JSON body.
pub async fn json_response(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    (status, body_json(response).await)
}

pub fn document(document_id: i64, title: &str) -> Document {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    Document {
        document_id,
        title: title.to_string(),
        author: Some("Jane Austen".to_string()),
        description: None,
        file_path: None,
        file_size: Some(2048),
        page_count: Some(320),
        reading_progress: Some(42.5),
        created_at: at,
        updated_at: at,
    }
}

pub fn word(vocabulary_id: i64, text: &str) -> VocabularyEntry {
    VocabularyEntry {
        vocabulary_id,
        word: text.to_string(),
        phonetic: Some(format!("/{text}/")),
        meaning: Some(format!("meaning of {text}")),
        part_of_speech: Some("noun".to_string()),
        difficulty: Some(2),
        mastery_level: 40,
        study_count: 10,
        correct_count: 7,
        wrong_count: 3,
        last_studied_at: None,
        next_review_date: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
    }
}
