//! Export and history endpoints driven through the full router.

mod common;

use std::io::{Cursor, Read};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use reading_server::reading_core::{ExportRecord, Highlight, Note, ReadingRecord};
use serde_json::json;
use zip::ZipArchive;

use common::{
    authed, body_bytes, body_json, document, json_response, word, TestApp, ALICE, BOB,
};

fn seed_words(app: &TestApp) {
    app.store.add_vocabulary(ALICE, word(1, "serendipity"));
    app.store.add_vocabulary(ALICE, word(2, "ephemeral"));
    app.store.add_vocabulary(ALICE, word(3, "quixotic"));
    app.store.add_vocabulary(BOB, word(4, "laconic"));
}

fn audit_row(export_id: &str, days_ago: i64, file_size: i64) -> ExportRecord {
    ExportRecord {
        export_id: export_id.to_string(),
        user_id: ALICE.get(),
        operation_type: "EXPORT".to_string(),
        entity_type: "document".to_string(),
        entity_ids: Some(vec![1]),
        format: "pdf".to_string(),
        status: "COMPLETED".to_string(),
        item_count: 1,
        file_size,
        filename: Some(format!("{export_id}.pdf")),
        details: json!({}),
        created_at: Utc::now() - Duration::days(days_ago),
    }
}

#[tokio::test]
async fn health_needs_no_session() {
    let app = TestApp::new();
    let response = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(app.store.queries(), 0);
}

#[tokio::test]
async fn missing_bearer_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::get("/api/v1/export/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
    let app = TestApp::new();
    app.store
        .add_session_expiring("stale", ALICE, Utc::now() - Duration::minutes(5));

    let response = app
        .send(
            Request::get("/api/v1/export/stats")
                .header(header::AUTHORIZATION, "Bearer stale")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new();
    let response = app
        .send(
            authed(Method::GET, "/api/v1/export/stats")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn unsupported_format_is_rejected_before_any_data_query() {
    let app = TestApp::new();
    seed_words(&app);

    let response = app
        .post_json(
            "/api/v1/export/vocabulary/batch",
            json!({ "vocabulary_ids": [1, 2], "format": "html" }),
        )
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["format"], "html");
    let supported = body["error"]["details"]["supported_formats"]
        .as_array()
        .unwrap();
    assert!(supported.contains(&json!("csv")));
    assert!(!supported.contains(&json!("html")));
    // Only the session lookup ran.
    assert_eq!(app.store.queries(), 1);
    assert!(app.store.export_records(ALICE).is_empty());
}

#[tokio::test]
async fn foreign_ids_are_reported_and_nothing_is_recorded() {
    let app = TestApp::new();
    seed_words(&app);

    let response = app
        .post_json(
            "/api/v1/export/vocabulary/batch",
            json!({ "vocabulary_ids": [1, 4, 99], "format": "csv" }),
        )
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "VOCABULARY_NOT_FOUND");
    assert_eq!(body["error"]["details"]["vocabulary_ids"], json!([4, 99]));
    assert!(app.store.export_records(ALICE).is_empty());
}

#[tokio::test]
async fn empty_id_list_is_a_validation_error() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/v1/export/documents/batch",
            json!({ "document_ids": [], "format": "pdf" }),
        )
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], "document_ids");
}

#[tokio::test]
async fn vocabulary_csv_download_is_audited() {
    let app = TestApp::new();
    seed_words(&app);

    let response = app
        .post_json(
            "/api/v1/export/vocabulary/batch",
            json!({
                "vocabulary_ids": [1, 2, 3],
                "format": "csv",
                "include_examples": false,
                "include_statistics": false,
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"vocabulary_"));
    assert!(disposition.ends_with(".csv\""));
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body.lines().count(), 4);
    assert!(body.starts_with("Word,Phonetic,Meaning"));

    let records = app.store.export_records(ALICE);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.item_count, 3);
    assert_eq!(record.format, "csv");
    assert_eq!(record.status, "COMPLETED");
    assert_eq!(record.entity_ids, Some(vec![1, 2, 3]));
    assert_eq!(record.file_size, body.len() as i64);
    assert_eq!(headers["x-export-id"], record.export_id.as_str());
    assert!(disposition.contains(record.filename.as_deref().unwrap()));
}

#[tokio::test]
async fn vocabulary_json_total_matches_csv_rows() {
    let app = TestApp::new();
    seed_words(&app);

    let json_export = app
        .post_json(
            "/api/v1/export/vocabulary/batch",
            json!({ "vocabulary_ids": [1, 2, 3], "format": "json" }),
        )
        .await;
    assert_eq!(json_export.status(), StatusCode::OK);
    let document = body_json(json_export).await;

    let csv_export = app
        .post_json(
            "/api/v1/export/vocabulary/batch",
            json!({
                "vocabulary_ids": [1, 2, 3],
                "format": "csv",
                "include_examples": false,
                "include_statistics": false,
            }),
        )
        .await;
    let csv = String::from_utf8(body_bytes(csv_export).await).unwrap();

    assert_eq!(document["total_words"], 3);
    assert_eq!(
        document["total_words"].as_u64().unwrap() as usize,
        csv.lines().count() - 1
    );
    assert_eq!(document["vocabulary"].as_array().unwrap().len(), 3);
    assert_eq!(document["statistics"]["total_words"], 3);
}

#[tokio::test]
async fn reviews_need_exactly_one_selector() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/v1/export/reviews/batch",
            json!({ "review_ids": [1], "date_range": "2024-01-01,2024-01-31", "format": "json" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn encrypted_full_export_is_not_available() {
    let app = TestApp::new();
    let response = app.get("/api/v1/export/all?format=json&encrypt=true").await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"]["code"], "FEATURE_NOT_AVAILABLE");
}

#[tokio::test]
async fn history_lists_recorded_exports() {
    let app = TestApp::new();
    app.store.add_export_record(audit_row("documents_a", 1, 100));
    app.store.add_export_record(audit_row("documents_b", 2, 200));

    let response = app.get("/api/v1/export/history?page=1&page_size=1").await;
    let (status, body) = json_response(response).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 1);
    assert_eq!(data["items"][0]["export_id"], "documents_a");
    assert!(data["items"][0].get("user_id").is_none());
    assert_eq!(data["pagination"]["total"], 2);
    assert_eq!(data["pagination"]["has_next"], true);
}

#[tokio::test]
async fn deleting_unknown_history_record_is_not_found() {
    let app = TestApp::new();
    let response = app.delete("/api/v1/export/history/documents_missing").await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "HISTORY_NOT_FOUND");
}

#[tokio::test]
async fn cleanup_is_idempotent() {
    let app = TestApp::new();
    app.store.add_export_record(audit_row("old_a", 40, 1_000));
    app.store.add_export_record(audit_row("old_b", 90, 500));
    app.store.add_export_record(audit_row("fresh", 3, 250));

    let first = app.delete("/api/v1/export/cleanup?daysOld=30").await;
    let (status, body) = json_response(first).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_count"], 2);
    assert_eq!(body["data"]["freed_space"], 1_500);

    let second = app.delete("/api/v1/export/cleanup?daysOld=30").await;
    let (status, body) = json_response(second).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_count"], 0);

    let remaining = app.store.export_records(ALICE);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].export_id, "fresh");
}

#[tokio::test]
async fn cleanup_rejects_out_of_range_age() {
    let app = TestApp::new();
    let response = app.delete("/api/v1/export/cleanup?daysOld=400").await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["valid_range"], "1-365");
}

#[tokio::test]
async fn format_catalog_lists_every_type() {
    let app = TestApp::new();
    let response = app.get("/api/v1/export/formats").await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["vocabulary"]["csv"].is_object());
    assert!(body["data"]["all_data"]["json"].is_object());
}

// ============================================================================
// Remaining export kinds
// ============================================================================

fn at(day: u32, hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn note(note_id: i64, document_id: i64, content: &str) -> Note {
    Note {
        note_id,
        document_id,
        document_title: None,
        page_number: Some(3),
        content: content.to_string(),
        highlight_id: None,
        created_at: at(2, 10),
        updated_at: at(2, 10),
    }
}

fn highlight(highlight_id: i64, document_id: i64, page: i32, text: &str) -> Highlight {
    Highlight {
        highlight_id,
        document_id,
        page_number: Some(page),
        text_content: text.to_string(),
        color: Some("#ffeb3b".to_string()),
        start_position: Some(0),
        end_position: Some(text.len() as i32),
        created_at: at(3, 9),
    }
}

fn reading_session(history_id: i64, document_id: i64, day: u32) -> ReadingRecord {
    ReadingRecord {
        history_id,
        document_id,
        document_title: None,
        start_time: at(day, 20),
        end_time: Some(at(day, 21)),
        duration_seconds: Some(3600),
        pages_read: Some(25),
        created_at: at(day, 21),
    }
}

fn seed_due(app: &TestApp, vocabulary_id: i64, text: &str, due: NaiveDate, mastery: i32) {
    let mut entry = word(vocabulary_id, text);
    entry.next_review_date = Some(due);
    entry.mastery_level = mastery;
    app.store.add_vocabulary(ALICE, entry);
}

#[tokio::test]
async fn reading_history_without_records_is_not_found() {
    let app = TestApp::new();
    app.store.add_reading_record(BOB, reading_session(9, 20, 4));

    let response = app.get("/api/v1/export/reading-history?format=csv").await;
    let (status, body) = json_response(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "READING_HISTORY_NOT_FOUND");
    assert!(app.store.export_records(ALICE).is_empty());
}

#[tokio::test]
async fn reading_history_csv_lists_sessions_newest_first() {
    let app = TestApp::new();
    app.store.add_document(ALICE, document(10, "Emma"));
    app.store.add_reading_record(ALICE, reading_session(1, 10, 4));
    app.store.add_reading_record(ALICE, reading_session(2, 10, 6));

    let response = app.get("/api/v1/export/reading-history?format=csv").await;
    assert_eq!(response.status(), StatusCode::OK);
    let csv = String::from_utf8(body_bytes(response).await).unwrap();

    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("2,10,Emma,"));
    assert!(rows[2].starts_with("1,10,Emma,"));
    assert_eq!(app.store.export_records(ALICE)[0].item_count, 2);
}

#[tokio::test]
async fn documents_html_escapes_titles() {
    let app = TestApp::new();
    app.store.add_document(ALICE, document(10, "Pride & <Prejudice>"));

    let response = app
        .post_json(
            "/api/v1/export/documents/batch",
            json!({ "document_ids": [10], "format": "html" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Pride &amp; &lt;Prejudice&gt;"));
    assert!(!html.contains("<Prejudice>"));
    let record = &app.store.export_records(ALICE)[0];
    assert_eq!(record.format, "html");
    assert_eq!(record.entity_ids, Some(vec![10]));
}

#[tokio::test]
async fn notes_json_counts_selected_notes() {
    let app = TestApp::new();
    app.store.add_document(ALICE, document(10, "Emma"));
    app.store.add_note(ALICE, note(1, 10, "Mr. Knightley is right"));
    app.store.add_note(ALICE, note(2, 10, "Box Hill"));

    let response = app
        .post_json(
            "/api/v1/export/notes/batch",
            json!({ "note_ids": [2], "format": "json" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["total_notes"], 1);
    assert_eq!(body["notes"][0]["content"], "Box Hill");
}

#[tokio::test]
async fn highlights_of_foreign_document_are_not_found() {
    let app = TestApp::new();
    app.store.add_document(BOB, document(20, "Persuasion"));
    app.store.add_highlight(BOB, highlight(1, 20, 4, "half agony, half hope"));

    let response = app.get("/api/v1/export/documents/20/highlights").await;
    let (status, body) = json_response(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "DOCUMENT_NOT_FOUND");
    assert_eq!(body["error"]["details"]["document_ids"], json!([20]));
    assert!(app.store.export_records(ALICE).is_empty());
}

#[tokio::test]
async fn highlights_file_is_named_after_the_document() {
    let app = TestApp::new();
    app.store.add_document(ALICE, document(10, "Emma"));
    app.store.add_highlight(ALICE, highlight(1, 10, 7, "badly done"));
    app.store.add_highlight(ALICE, highlight(2, 10, 2, "handsome, clever"));

    let response = app.get("/api/v1/export/documents/10/highlights").await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("filename=\"highlights_10_"));
    assert!(disposition.ends_with(".json\""));

    let body = body_json(response).await;
    assert_eq!(body["total_highlights"], 2);
    assert_eq!(body["highlights"][0]["page_number"], 2);
}

#[tokio::test]
async fn statistics_json_has_every_section() {
    let app = TestApp::new();
    seed_words(&app);

    let response = app.get("/api/v1/export/statistics?format=json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    for section in [
        "daily_stats",
        "vocabulary_stats",
        "achievements",
        "review_stats",
        "reading_stats",
        "learning_trend",
    ] {
        assert!(body.get(section).is_some(), "missing {section}");
    }
    assert!(body.get("charts").is_none());
    assert!(body["learning_trend"].is_array());
}

#[tokio::test]
async fn statistics_rejects_malformed_range() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/export/statistics?format=json&date_range=2024-05-01")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.queries(), 1);
}

#[tokio::test]
async fn study_plan_defers_words_above_daily_goal() {
    let app = TestApp::new();
    let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    seed_due(&app, 1, "aplomb", monday, 70);
    seed_due(&app, 2, "brusque", monday, 10);
    seed_due(&app, 3, "candor", monday + Duration::days(1), 50);

    let response = app
        .post_json(
            "/api/v1/export/study-plan",
            json!({
                "start_date": "2024-06-03",
                "end_date": "2024-06-05",
                "daily_goal": 1,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();

    assert!(text.contains("2024-06-03 (1 words)"));
    assert!(text.contains("brusque"));
    assert!(!text.contains("aplomb"));
    assert!(text.contains("2024-06-05 (0 words)"));

    let record = &app.store.export_records(ALICE)[0];
    assert_eq!(record.format, "txt");
    assert_eq!(record.item_count, 2);
    assert_eq!(record.details["total_due"], 3);
    assert_eq!(record.details["deferred"], 1);
}

#[tokio::test]
async fn study_plan_rejects_reversed_range() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/v1/export/study-plan",
            json!({ "start_date": "2024-06-05", "end_date": "2024-06-03" }),
        )
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(app.store.export_records(ALICE).is_empty());
}

#[tokio::test]
async fn anki_deck_is_audited_as_anki_csv() {
    let app = TestApp::new();
    seed_words(&app);

    let response = app
        .post_json(
            "/api/v1/export/anki",
            json!({ "vocabulary_ids": [1, 2], "include_audio": true }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("filename=\"anki_export_"));
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(csv.lines().count(), 3);

    let record = &app.store.export_records(ALICE)[0];
    assert_eq!(record.format, "anki_csv");
    assert_eq!(record.item_count, 2);
    assert_eq!(record.details["deck_name"], "Vocabulary");
    assert_eq!(record.details["include_audio"], true);
}

#[tokio::test]
async fn batch_bundle_starts_with_readme() {
    let app = TestApp::new();
    app.store.add_document(ALICE, document(10, "Emma"));
    seed_words(&app);

    let response = app
        .post_json(
            "/api/v1/export/batch",
            json!({ "types": ["vocabulary", "documents", "vocabulary"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    let bytes = body_bytes(response).await;

    let mut archive = ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(archive.len(), 3);
    let mut readme = String::new();
    archive
        .by_index(0)
        .unwrap()
        .read_to_string(&mut readme)
        .unwrap();
    assert!(readme.contains("vocabulary.json"));
    assert!(readme.contains("documents.json"));

    let mut vocabulary = String::new();
    archive
        .by_name("vocabulary.json")
        .unwrap()
        .read_to_string(&mut vocabulary)
        .unwrap();
    let vocabulary: serde_json::Value = serde_json::from_str(&vocabulary).unwrap();
    assert_eq!(vocabulary["metadata"]["count"], 3);

    let record = &app.store.export_records(ALICE)[0];
    assert_eq!(record.details["file_count"], 3);
    assert_eq!(record.details["types"], json!(["vocabulary", "documents"]));
    assert_eq!(record.details["total_size"], bytes.len() as u64);
    assert_eq!(record.item_count, 4);
}

#[tokio::test]
async fn batch_rejects_unknown_types() {
    let app = TestApp::new();
    let response = app
        .post_json("/api/v1/export/batch", json!({ "types": ["notes", "photos"] }))
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["invalid_types"], json!(["photos"]));
}

#[tokio::test]
async fn all_data_snapshot_has_ten_sections() {
    let app = TestApp::new();
    app.store.add_document(ALICE, document(10, "Emma"));
    app.store.add_document(BOB, document(20, "Persuasion"));
    seed_words(&app);

    let response = app.get("/api/v1/export/all").await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("filename=\"all_data_"));
    let body = body_json(response).await;

    assert_eq!(body["metadata"]["user_id"], ALICE.get());
    assert_eq!(body["metadata"]["version"], "1.0");
    assert_eq!(
        body["metadata"]["data_sections"].as_array().unwrap().len(),
        10
    );
    assert_eq!(body["data"]["documents"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["vocabulary"].as_array().unwrap().len(), 3);
    assert_eq!(app.store.export_records(ALICE)[0].format, "json");
}

// ============================================================================
// Templates
// ============================================================================

#[tokio::test]
async fn template_names_are_unique_per_user() {
    let app = TestApp::new();
    let template = json!({
        "name": "Weekly notes",
        "type": "notes",
        "format": "html",
        "config": { "groupByDocument": true },
    });

    let (status, body) = json_response(app.post_json("/api/v1/export/templates", template.clone()).await).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["template_id"].as_str().unwrap().starts_with("tpl_"));

    let (status, body) = json_response(app.post_json("/api/v1/export/templates", template).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, body) = json_response(app.get("/api/v1/export/templates?type=notes").await).await;
    assert_eq!(status, StatusCode::OK);
    let templates = body["data"]["templates"].as_array().unwrap();
    assert_eq!(templates.first().unwrap()["template_id"], "system_notes_html_default");
    assert_eq!(templates.last().unwrap()["name"], "Weekly notes");
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn template_format_must_match_type() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/v1/export/templates",
            json!({ "name": "Deck", "type": "vocabulary", "format": "html", "config": {} }),
        )
        .await;

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
