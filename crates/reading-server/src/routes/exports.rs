//! Export generator routes.
//!
//! Every generator follows the same sequence:
//! - resolve the format against the kind's allow-list
//! - check the id list and that every id belongs to the caller
//! - load rows, render in memory
//! - append one audit record and return the bytes as an attachment
//!
//! Routes:
//! - POST /export/documents/batch
//! - POST /export/vocabulary/batch
//! - POST /export/reviews/batch
//! - POST /export/notes/batch
//! - GET /export/documents/{document_id}/highlights
//! - GET /export/reading-history
//! - GET /export/statistics
//! - POST /export/study-plan
//! - POST /export/anki
//! - POST /export/batch
//! - GET /export/all

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use reading_core::{ExportFormat, ExportId, ExportKind, UserId};
use reading_export::{
    build_bundle, export_filename_now, plan_days, render_anki, AllData, BatchSection,
    DocumentsExport, HighlightsExport, NotesExport, ReadingHistoryExport, ReviewsExport,
    StatisticsExport, StudyPlan, VocabularyExport, ANKI_AUDIT_FORMAT, DAILY_STATS_LIMIT,
    DATA_SECTIONS, DEFAULT_DAILY_GOAL, DEFAULT_DECK_NAME, EXAMPLES_PER_WORD, MAX_PLAN_DAYS,
    TREND_DAYS,
};
use reading_store::{NewExportRecord, OwnedEntity};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody, PathParams, QueryParams};
use crate::response::FileDownload;
use crate::state::AppState;
use crate::validate;

// ============================================================================
// Request Types
// ============================================================================

fn default_true() -> bool {
    true
}

/// Request body for POST /export/documents/batch.
#[derive(Debug, Deserialize)]
pub struct DocumentsRequest {
    #[serde(default)]
    pub document_ids: Vec<i64>,
    pub format: Option<String>,
    #[serde(default)]
    pub include_notes: bool,
    #[serde(default)]
    pub include_highlights: bool,
    pub template: Option<String>,
}

/// Request body for POST /export/vocabulary/batch.
#[derive(Debug, Deserialize)]
pub struct VocabularyRequest {
    #[serde(default)]
    pub vocabulary_ids: Vec<i64>,
    pub format: Option<String>,
    #[serde(default = "default_true")]
    pub include_examples: bool,
    #[serde(default = "default_true")]
    pub include_statistics: bool,
}

/// Request body for POST /export/reviews/batch. Exactly one selector.
#[derive(Debug, Deserialize)]
pub struct ReviewsRequest {
    pub review_ids: Option<Vec<i64>>,
    pub date_range: Option<String>,
    pub format: Option<String>,
}

/// Request body for POST /export/notes/batch.
#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub note_ids: Vec<i64>,
    pub format: Option<String>,
}

/// Query for endpoints taking only a format.
#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

/// Query for GET /export/statistics.
#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    pub format: Option<String>,
    pub date_range: Option<String>,
    #[serde(default)]
    pub include_charts: bool,
}

/// Request body for POST /export/study-plan.
#[derive(Debug, Deserialize)]
pub struct StudyPlanRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_goal: Option<i64>,
    #[serde(default = "default_true")]
    pub include_progress: bool,
    pub format: Option<String>,
}

/// Request body for POST /export/anki.
#[derive(Debug, Deserialize)]
pub struct AnkiRequest {
    #[serde(default)]
    pub vocabulary_ids: Vec<i64>,
    pub deck_name: Option<String>,
    #[serde(default)]
    pub include_audio: bool,
    #[serde(default)]
    pub include_images: bool,
    pub format: Option<String>,
}

/// Request body for POST /export/batch.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub types: Vec<String>,
    pub format: Option<String>,
    pub template: Option<String>,
}

/// Query for GET /export/all.
#[derive(Debug, Deserialize)]
pub struct AllDataQuery {
    pub format: Option<String>,
    #[serde(default)]
    pub encrypt: bool,
}

// ============================================================================
// Delivery
// ============================================================================

/// What the audit record and the download headers need to know about a
/// rendered export.
struct Delivery {
    kind: ExportKind,
    audit_format: &'static str,
    extension: &'static str,
    content_type: &'static str,
    prefix: String,
    entity_ids: Option<Vec<i64>>,
    item_count: usize,
    details: Value,
}

impl Delivery {
    fn new(kind: ExportKind, format: ExportFormat, item_count: usize) -> Self {
        Self {
            kind,
            audit_format: format.as_str(),
            extension: format.extension(),
            content_type: format.content_type(),
            prefix: kind.file_prefix().to_string(),
            entity_ids: None,
            item_count,
            details: json!({}),
        }
    }

    fn entity_ids(mut self, ids: Vec<i64>) -> Self {
        self.entity_ids = Some(ids);
        self
    }

    fn details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Name the file, mint the export id, append the audit record and wrap the
/// bytes for download. Runs only after rendering succeeded.
async fn deliver(
    state: &AppState,
    user: UserId,
    delivery: Delivery,
    bytes: Vec<u8>,
) -> ApiResult<FileDownload> {
    let filename = export_filename_now(&delivery.prefix, delivery.extension);
    let export_id = ExportId::mint(delivery.kind);
    let file_size = i64::try_from(bytes.len()).unwrap_or(i64::MAX);

    state
        .backend()
        .record_export(NewExportRecord {
            export_id: export_id.to_string(),
            user_id: user,
            kind: delivery.kind,
            entity_ids: delivery.entity_ids,
            format: delivery.audit_format.to_string(),
            item_count: i32::try_from(delivery.item_count).unwrap_or(i32::MAX),
            file_size,
            filename: filename.clone(),
            details: delivery.details,
        })
        .await?;

    tracing::info!(
        user_id = %user,
        export_id = %export_id,
        kind = %delivery.kind,
        format = delivery.audit_format,
        items = delivery.item_count,
        bytes = file_size,
        "Export completed"
    );

    Ok(FileDownload {
        filename,
        content_type: delivery.content_type,
        export_id,
        bytes,
    })
}

fn nothing_to_export(what: &str) -> ApiError {
    ApiError::not_found("NOT_FOUND", format!("no {what} to export"), json!({}))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /export/documents/batch - Documents with optional notes and highlights.
async fn export_documents(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<DocumentsRequest>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Documents;
    let format = validate::export_format(kind, request.format.as_deref())?;
    let ids = request.document_ids.as_slice();
    validate::id_list(kind, OwnedEntity::Document, ids)?;

    let backend = state.backend();
    validate::ensure_owned(backend, user, kind, OwnedEntity::Document, ids).await?;

    let documents = backend.documents(user, Some(ids)).await?;
    if documents.is_empty() {
        return Err(nothing_to_export("documents"));
    }
    let notes = if request.include_notes {
        backend.notes_for_documents(user, ids).await?
    } else {
        Vec::new()
    };
    let highlights = if request.include_highlights {
        backend.highlights(user, Some(ids)).await?
    } else {
        Vec::new()
    };

    let bytes = DocumentsExport {
        documents: &documents,
        notes: &notes,
        highlights: &highlights,
    }
    .render(format, Utc::now())?;

    let delivery = Delivery::new(kind, format, documents.len())
        .entity_ids(ids.to_vec())
        .details(json!({
            "include_notes": request.include_notes,
            "include_highlights": request.include_highlights,
            "notes_count": notes.len(),
            "highlights_count": highlights.len(),
            "template": request.template,
        }));
    deliver(&state, user, delivery, bytes).await
}

/// POST /export/vocabulary/batch - Word list with examples and statistics.
async fn export_vocabulary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<VocabularyRequest>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Vocabulary;
    let format = validate::export_format(kind, request.format.as_deref())?;
    let ids = request.vocabulary_ids.as_slice();
    validate::id_list(kind, OwnedEntity::Vocabulary, ids)?;

    let backend = state.backend();
    validate::ensure_owned(backend, user, kind, OwnedEntity::Vocabulary, ids).await?;

    let entries = backend.vocabulary(user, Some(ids)).await?;
    if entries.is_empty() {
        return Err(nothing_to_export("vocabulary"));
    }
    let examples = if request.include_examples {
        Some(backend.word_examples(user, ids, EXAMPLES_PER_WORD).await?)
    } else {
        None
    };

    let bytes = VocabularyExport {
        entries: &entries,
        examples: examples.as_deref(),
        include_statistics: request.include_statistics,
    }
    .render(format, Utc::now())?;

    let delivery = Delivery::new(kind, format, entries.len())
        .entity_ids(ids.to_vec())
        .details(json!({
            "include_examples": request.include_examples,
            "include_statistics": request.include_statistics,
        }));
    deliver(&state, user, delivery, bytes).await
}

/// POST /export/reviews/batch - Review sessions by id or by date range.
async fn export_reviews(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<ReviewsRequest>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Reviews;
    let format = validate::export_format(kind, request.format.as_deref())?;
    let backend = state.backend();

    let sessions = match (&request.review_ids, request.date_range.as_deref()) {
        (Some(ids), None) => {
            validate::id_list(kind, OwnedEntity::ReviewSession, ids)?;
            validate::ensure_owned(backend, user, kind, OwnedEntity::ReviewSession, ids).await?;
            backend.review_sessions(user, Some(ids.as_slice())).await?
        }
        (None, Some(raw)) => {
            let (start, end) = validate::date_range(raw)?;
            backend.review_sessions_between(user, start, end).await?
        }
        _ => {
            return Err(ApiError::validation(
                "provide exactly one of review_ids or date_range",
            ));
        }
    };
    if sessions.is_empty() {
        return Err(nothing_to_export("review sessions"));
    }

    let session_ids: Vec<i64> = sessions.iter().map(|s| s.review_session_id).collect();
    let items = backend.review_items(user, &session_ids).await?;

    let bytes = ReviewsExport {
        sessions: &sessions,
        items: &items,
    }
    .render(format, Utc::now())?;

    let delivery = Delivery::new(kind, format, sessions.len())
        .entity_ids(session_ids)
        .details(json!({
            "date_range": request.date_range,
            "items_count": items.len(),
        }));
    deliver(&state, user, delivery, bytes).await
}

/// POST /export/notes/batch - Notes grouped by document.
async fn export_notes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<NotesRequest>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Notes;
    let format = validate::export_format(kind, request.format.as_deref())?;
    let ids = request.note_ids.as_slice();
    validate::id_list(kind, OwnedEntity::Note, ids)?;

    let backend = state.backend();
    validate::ensure_owned(backend, user, kind, OwnedEntity::Note, ids).await?;

    let notes = backend.notes(user, Some(ids)).await?;
    if notes.is_empty() {
        return Err(nothing_to_export("notes"));
    }

    let bytes = NotesExport { notes: &notes }.render(format, Utc::now())?;

    let delivery = Delivery::new(kind, format, notes.len()).entity_ids(ids.to_vec());
    deliver(&state, user, delivery, bytes).await
}

/// GET /export/documents/{document_id}/highlights - Highlights of one document.
async fn export_highlights(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(document_id): PathParams<i64>,
    QueryParams(query): QueryParams<FormatQuery>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Highlights;
    let format = validate::export_format(kind, query.format.as_deref())?;
    let ids = [document_id];

    let backend = state.backend();
    validate::ensure_owned(backend, user, kind, OwnedEntity::Document, &ids).await?;

    let document = backend
        .documents(user, Some(&ids[..]))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ApiError::not_found(
                kind.not_found_code(),
                format!("document {document_id} not found"),
                json!({ "document_ids": ids }),
            )
        })?;
    let highlights = backend.highlights(user, Some(&ids[..])).await?;

    let export = HighlightsExport {
        document: &document,
        highlights: &highlights,
    };
    let bytes = export.render(format, Utc::now())?;

    let mut delivery = Delivery::new(kind, format, highlights.len())
        .entity_ids(ids.to_vec())
        .details(json!({ "document_title": document.title }));
    delivery.prefix = export.file_prefix();
    deliver(&state, user, delivery, bytes).await
}

/// GET /export/reading-history - Reading sessions, newest first.
async fn export_reading_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<FormatQuery>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::ReadingHistory;
    let format = validate::export_format(kind, query.format.as_deref())?;

    let records = state.backend().reading_history(user).await?;
    if records.is_empty() {
        return Err(ApiError::not_found(
            kind.not_found_code(),
            "no reading history to export",
            json!({}),
        ));
    }
    let bytes = ReadingHistoryExport { records: &records }.render(format, Utc::now())?;

    let delivery = Delivery::new(kind, format, records.len());
    deliver(&state, user, delivery, bytes).await
}

/// GET /export/statistics - Learning report.
async fn export_statistics(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<StatisticsQuery>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Statistics;
    let format = validate::export_format(kind, query.format.as_deref())?;
    let date_range = match query.date_range.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(validate::date_range(raw)?),
    };

    let backend = state.backend();
    let now = Utc::now();
    let trend_since = now.date_naive() - Duration::days(TREND_DAYS - 1);

    let daily_stats = backend
        .daily_stats(user, date_range, Some(DAILY_STATS_LIMIT))
        .await?;
    let mastery = backend.mastery_distribution(user).await?;
    let achievements = backend.achievements(user).await?;
    let review = backend.review_summary(user).await?;
    let reading = backend.reading_summary(user).await?;
    let trend = backend.learning_trend(user, trend_since).await?;

    let bytes = StatisticsExport {
        date_range,
        include_charts: query.include_charts,
        daily_stats: &daily_stats,
        mastery: &mastery,
        achievements: &achievements,
        review: &review,
        reading: &reading,
        trend: &trend,
    }
    .render(format, now)?;

    let delivery = Delivery::new(kind, format, daily_stats.len()).details(json!({
        "date_range": query.date_range.unwrap_or_else(|| "all".to_string()),
        "include_charts": query.include_charts,
    }));
    deliver(&state, user, delivery, bytes).await
}

/// POST /export/study-plan - Day-by-day review schedule.
async fn export_study_plan(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<StudyPlanRequest>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::StudyPlan;
    let format = validate::export_format(kind, request.format.as_deref())?;

    let daily_goal = match request.daily_goal {
        None => DEFAULT_DAILY_GOAL,
        Some(goal @ 1..=100) => u32::try_from(goal).unwrap_or(DEFAULT_DAILY_GOAL),
        Some(goal) => {
            return Err(ApiError::validation_with(
                "daily_goal must be between 1 and 100",
                json!({ "daily_goal": goal }),
            ));
        }
    };

    let (start, end) = (request.start_date, request.end_date);
    if end < start {
        return Err(ApiError::validation_with(
            "end_date must not be before start_date",
            json!({ "start_date": start, "end_date": end }),
        ));
    }
    let days = plan_days(start, end);
    if days > MAX_PLAN_DAYS {
        return Err(ApiError::validation_with(
            format!("a study plan may span at most {MAX_PLAN_DAYS} days"),
            json!({ "days": days, "max_days": MAX_PLAN_DAYS }),
        ));
    }

    let due = state.backend().due_words(user, start, end).await?;
    let plan = StudyPlan::build(start, end, daily_goal, &due);
    let bytes = plan.render_text(request.include_progress, Utc::now());

    let delivery = Delivery::new(kind, format, plan.scheduled()).details(json!({
        "start_date": start,
        "end_date": end,
        "daily_goal": daily_goal,
        "total_due": plan.total_due(),
        "deferred": plan.deferred(),
        "workload": plan.workload().as_str(),
    }));
    deliver(&state, user, delivery, bytes).await
}

/// POST /export/anki - Flashcard deck as CSV.
async fn export_anki(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<AnkiRequest>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Anki;
    let format = validate::export_format(kind, request.format.as_deref())?;
    let ids = request.vocabulary_ids.as_slice();
    validate::id_list(kind, OwnedEntity::Vocabulary, ids)?;

    let backend = state.backend();
    validate::ensure_owned(backend, user, kind, OwnedEntity::Vocabulary, ids).await?;

    let cards = backend.anki_cards(user, ids).await?;
    let bytes = render_anki(&cards);

    let deck_name = request
        .deck_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DECK_NAME.to_string());
    let mut delivery = Delivery::new(kind, format, cards.len())
        .entity_ids(ids.to_vec())
        .details(json!({
            "deck_name": deck_name,
            "include_audio": request.include_audio,
            "include_images": request.include_images,
        }));
    delivery.audit_format = ANKI_AUDIT_FORMAT;
    deliver(&state, user, delivery, bytes).await
}

/// POST /export/batch - Several kinds bundled into one zip.
async fn export_batch(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<BatchRequest>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::Batch;
    let format = validate::export_format(kind, request.format.as_deref())?;
    let kinds = batch_kinds(&request.types)?;

    let backend = state.backend();
    let mut sections = Vec::with_capacity(kinds.len());
    for section_kind in &kinds {
        let section = match section_kind {
            ExportKind::Documents => {
                BatchSection::new(*section_kind, &backend.documents(user, None).await?)?
            }
            ExportKind::Vocabulary => {
                BatchSection::new(*section_kind, &backend.vocabulary(user, None).await?)?
            }
            ExportKind::Reviews => {
                BatchSection::new(*section_kind, &backend.review_sessions(user, None).await?)?
            }
            ExportKind::Statistics => {
                BatchSection::new(*section_kind, &backend.daily_stats(user, None, None).await?)?
            }
            ExportKind::Notes => {
                BatchSection::new(*section_kind, &backend.notes(user, None).await?)?
            }
            ExportKind::Highlights => {
                BatchSection::new(*section_kind, &backend.highlights(user, None).await?)?
            }
            _ => BatchSection::new(*section_kind, &backend.reading_history(user).await?)?,
        };
        sections.push(section);
    }

    let bundle = build_bundle(user, &sections, Utc::now())?;
    let item_count = sections.iter().map(|s| s.count).sum();
    let types: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();

    let delivery = Delivery::new(kind, format, item_count).details(json!({
        "types": types,
        "file_count": bundle.file_count,
        "total_size": bundle.total_size,
        "template": request.template,
    }));
    deliver(&state, user, delivery, bundle.bytes).await
}

/// Parse and dedupe the requested batch kinds, keeping request order.
fn batch_kinds(types: &[String]) -> ApiResult<Vec<ExportKind>> {
    let supported: Vec<&str> = ExportKind::BATCHABLE.iter().map(|k| k.as_str()).collect();
    if types.is_empty() {
        return Err(ApiError::validation_with(
            "types must name at least one export type",
            json!({ "supported_types": supported }),
        ));
    }

    let mut kinds = Vec::with_capacity(types.len());
    let mut invalid = Vec::new();
    for raw in types {
        match raw.parse::<ExportKind>() {
            Ok(kind) if ExportKind::BATCHABLE.contains(&kind) => {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            _ => invalid.push(raw.as_str()),
        }
    }

    if !invalid.is_empty() {
        return Err(ApiError::validation_with(
            format!("unsupported batch types: {}", invalid.join(", ")),
            json!({ "invalid_types": invalid, "supported_types": supported }),
        ));
    }
    Ok(kinds)
}

/// GET /export/all - Full account snapshot.
async fn export_all_data(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(query): QueryParams<AllDataQuery>,
) -> ApiResult<FileDownload> {
    let kind = ExportKind::AllData;
    let format = validate::export_format(kind, query.format.as_deref())?;
    if query.encrypt {
        return Err(ApiError::FeatureNotAvailable(
            "encrypted exports are not available".into(),
        ));
    }

    let backend = state.backend();
    let data = AllData {
        user_info: backend.user_info(user).await?,
        documents: backend.documents(user, None).await?,
        vocabulary: backend.vocabulary(user, None).await?,
        reviews: backend.review_sessions(user, None).await?,
        learning_stats: backend.daily_stats(user, None, None).await?,
        notes: backend.notes(user, None).await?,
        highlights: backend.highlights(user, None).await?,
        reading_history: backend.reading_history(user).await?,
        settings: backend.settings(user).await?,
        achievements: backend.achievements(user).await?,
    };
    let bytes = data.render(user, Utc::now())?;

    let delivery = Delivery::new(kind, format, data.item_count())
        .details(json!({ "data_sections": DATA_SECTIONS }));
    deliver(&state, user, delivery, bytes).await
}

/// Build export routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export/documents/batch", post(export_documents))
        .route("/export/vocabulary/batch", post(export_vocabulary))
        .route("/export/reviews/batch", post(export_reviews))
        .route("/export/notes/batch", post(export_notes))
        .route(
            "/export/documents/{document_id}/highlights",
            get(export_highlights),
        )
        .route("/export/reading-history", get(export_reading_history))
        .route("/export/statistics", get(export_statistics))
        .route("/export/study-plan", post(export_study_plan))
        .route("/export/anki", post(export_anki))
        .route("/export/batch", post(export_batch))
        .route("/export/all", get(export_all_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_kinds_dedupe_in_request_order() {
        let types = vec![
            "notes".to_string(),
            "documents".to_string(),
            "notes".to_string(),
        ];
        assert_eq!(
            batch_kinds(&types).unwrap(),
            vec![ExportKind::Notes, ExportKind::Documents]
        );
    }

    #[test]
    fn batch_kinds_reject_unknown_and_unbatchable() {
        let err = batch_kinds(&["anki".to_string(), "podcasts".to_string()]).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.details()["invalid_types"], json!(["anki", "podcasts"]));
        assert!(batch_kinds(&[]).is_err());
    }

    #[test]
    fn delivery_defaults_follow_the_kind() {
        let delivery = Delivery::new(ExportKind::Statistics, ExportFormat::Pdf, 3);
        assert_eq!(delivery.prefix, "learning_statistics");
        assert_eq!(delivery.extension, "pdf");
        assert_eq!(delivery.content_type, "application/pdf");
        assert!(delivery.entity_ids.is_none());
    }
}
