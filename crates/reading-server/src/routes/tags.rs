//! Tag routes.
//!
//! The CRUD routes are built once and mounted for each kind, which handlers
//! receive as an `Extension<TagKind>`:
//! - POST /tags/{document|vocabulary} - Create a tag
//! - GET /tags/{document|vocabulary} - List tags
//! - GET /tags/{document|vocabulary}/{tag_id} - Tag with recently tagged entities
//! - PUT /tags/{document|vocabulary}/{tag_id} - Partial update
//! - DELETE /tags/{document|vocabulary}/{tag_id} - Delete, optionally forced
//!
//! Plus:
//! - POST /tags/vocabulary/batch - Bulk delete or update vocabulary tags
//! - GET /tags/search - Ranked search across kinds
//! - POST /tags/merge - Merge one tag into another
//! - GET /tags/popular - Most used tags in a time window
//! - GET /tags/statistics - Counts per kind

use std::cmp::Ordering;

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use chrono::Utc;
use reading_core::{Pagination, Tag, TagId, TagKind, TaggedEntity};
use reading_store::{
    tag_relevance, BatchCounts, MergeOutcome, NewTag, TagChanges, TagListQuery, TagSort,
    TagStatistics, TimeRange, VocabularyTagBatch,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody, PathParams, QueryParams};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validate;

/// Tagged entities shown with a single tag.
pub const TAG_DETAIL_ENTITIES: i64 = 10;

/// Default and ceiling for popular tag listings.
pub const DEFAULT_POPULAR_LIMIT: i64 = 10;
pub const MAX_POPULAR_LIMIT: i64 = 50;

/// Default and ceiling for search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /tags/{kind}.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Request body for PUT /tags/{kind}/{tag_id}, also the `data` of a batch
/// update.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Query for GET /tags/{kind}.
#[derive(Debug, Deserialize)]
pub struct ListTagsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTagParams {
    #[serde(default)]
    pub force: bool,
}

/// Request body for POST /tags/vocabulary/batch.
#[derive(Debug, Deserialize)]
pub struct VocabularyBatchRequest {
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    pub operation: String,
    pub data: Option<UpdateTagRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub source_tag_id: i64,
    pub target_tag_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub limit: Option<String>,
    pub time_range: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TagDetail {
    #[serde(flatten)]
    pub tag: Tag,
    pub entities: Vec<TaggedEntity>,
}

#[derive(Debug, Serialize)]
pub struct TagPage {
    pub items: Vec<Tag>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct DeletedTag {
    pub tag_id: i64,
    pub removed_relations: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub tag: Tag,
    pub relevance: f64,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub items: Vec<SearchHit>,
    pub total: usize,
}

// ============================================================================
// Validation
// ============================================================================

/// `#RRGGBB`.
fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn check_name(name: &str) -> ApiResult<()> {
    validate::text_length("name", name, 1, 50)
}

fn check_color(color: &str) -> ApiResult<()> {
    if is_hex_color(color) {
        Ok(())
    } else {
        Err(ApiError::validation_with(
            "color must be a #RRGGBB hex value",
            json!({ "color": color }),
        ))
    }
}

fn check_description(description: &str) -> ApiResult<()> {
    validate::text_length("description", description, 0, 200)
}

fn tag_changes(request: UpdateTagRequest) -> ApiResult<TagChanges> {
    if let Some(name) = &request.name {
        check_name(name)?;
    }
    if let Some(color) = &request.color {
        check_color(color)?;
    }
    if let Some(description) = &request.description {
        check_description(description)?;
    }

    let changes = TagChanges {
        name: request.name.map(|n| n.trim().to_string()),
        color: request.color,
        description: request.description,
    };
    if changes.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }
    Ok(changes)
}

/// `all`, absent or empty means every kind.
fn optional_kind(raw: Option<&str>) -> ApiResult<Option<TagKind>> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ApiError::validation_with(
                format!("unknown tag type {raw:?}"),
                json!({ "type": raw, "supported_types": ["all", "document", "vocabulary"] }),
            )
        }),
    }
}

fn popular_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|limit| (1..=MAX_POPULAR_LIMIT).contains(limit))
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
}

fn search_limit(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .map(|limit| limit.clamp(1, MAX_SEARCH_LIMIT))
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
}

/// Score every tag, drop non-matches, best first then by name.
fn rank(tags: Vec<Tag>, query: &str, limit: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = tags
        .into_iter()
        .filter_map(|tag| tag_relevance(&tag, query).map(|relevance| SearchHit { tag, relevance }))
        .collect();
    hits.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.tag.name.cmp(&b.tag.name))
    });
    hits.truncate(limit);
    hits
}

// ============================================================================
// Per-kind Handlers
// ============================================================================

/// POST /tags/{kind} - Create a tag.
async fn create_tag(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CreateTagRequest>,
) -> ApiResult<ApiResponse<Tag>> {
    check_name(&request.name)?;
    if let Some(color) = &request.color {
        check_color(color)?;
    }
    if let Some(description) = &request.description {
        check_description(description)?;
    }

    let tag = state
        .backend()
        .create_tag(NewTag {
            kind,
            name: request.name.trim().to_string(),
            color: request.color,
            description: request.description,
        })
        .await?;

    tracing::info!(user_id = %user, tag_id = tag.tag_id, %kind, name = %tag.name, "Tag created");
    Ok(ApiResponse::created(tag).with_message("tag created"))
}

/// GET /tags/{kind}/{tag_id} - Tag with the caller's recently tagged entities.
async fn get_tag(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(user): AuthUser,
    PathParams(tag_id): PathParams<i64>,
) -> ApiResult<ApiResponse<TagDetail>> {
    let backend = state.backend();
    let tag = backend.get_tag(kind, TagId(tag_id)).await?;
    let entities = backend
        .tagged_entities(user, &tag, TAG_DETAIL_ENTITIES)
        .await?;
    Ok(ApiResponse::ok(TagDetail { tag, entities }))
}

/// GET /tags/{kind} - Paginated list.
async fn list_tags(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(_user): AuthUser,
    QueryParams(params): QueryParams<ListTagsParams>,
) -> ApiResult<ApiResponse<TagPage>> {
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(20);
    if page < 1 || !(1..=100).contains(&limit) {
        return Err(ApiError::validation_with(
            "page must be at least 1 and limit between 1 and 100",
            json!({ "page": page, "limit": limit }),
        ));
    }

    let query = TagListQuery {
        kind,
        search: params
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
        sort: params
            .sort
            .as_deref()
            .map(TagSort::parse_or_default)
            .unwrap_or_default(),
        ascending: !params
            .order
            .as_deref()
            .is_some_and(|order| order.trim().eq_ignore_ascii_case("desc")),
        page: u32::try_from(page).unwrap_or(u32::MAX),
        limit: u32::try_from(limit).unwrap_or(20),
    };

    let (items, total) = state.backend().list_tags(&query).await?;
    Ok(ApiResponse::ok(TagPage {
        items,
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}

/// PUT /tags/{kind}/{tag_id} - Partial update.
async fn update_tag(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(user): AuthUser,
    PathParams(tag_id): PathParams<i64>,
    JsonBody(request): JsonBody<UpdateTagRequest>,
) -> ApiResult<ApiResponse<Tag>> {
    let changes = tag_changes(request)?;
    let tag = state
        .backend()
        .update_tag(kind, TagId(tag_id), &changes)
        .await?;

    tracing::info!(user_id = %user, tag_id, %kind, "Tag updated");
    Ok(ApiResponse::ok(tag).with_message("tag updated"))
}

/// DELETE /tags/{kind}/{tag_id}?force=false - Delete; in-use tags need force.
async fn delete_tag(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(user): AuthUser,
    PathParams(tag_id): PathParams<i64>,
    QueryParams(params): QueryParams<DeleteTagParams>,
) -> ApiResult<ApiResponse<DeletedTag>> {
    let removed_relations = state
        .backend()
        .delete_tag(kind, TagId(tag_id), params.force)
        .await?;

    tracing::info!(user_id = %user, tag_id, %kind, removed_relations, "Tag deleted");
    Ok(ApiResponse::ok(DeletedTag {
        tag_id,
        removed_relations,
    })
    .with_message("tag deleted"))
}

/// POST /tags/vocabulary/batch - Delete or update several vocabulary tags.
async fn batch_vocabulary_tags(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<VocabularyBatchRequest>,
) -> ApiResult<ApiResponse<BatchCounts>> {
    if request.tag_ids.is_empty() {
        return Err(ApiError::validation("tag_ids must not be empty"));
    }
    let batch = match request.operation.trim().to_ascii_lowercase().as_str() {
        "delete" => VocabularyTagBatch::Delete,
        "update" => {
            let data = request
                .data
                .ok_or_else(|| ApiError::validation("update requires data"))?;
            VocabularyTagBatch::Update(tag_changes(data)?)
        }
        other => {
            return Err(ApiError::validation_with(
                format!("unknown operation {other:?}"),
                json!({ "operation": other, "supported_operations": ["delete", "update"] }),
            ));
        }
    };

    let ids: Vec<TagId> = request.tag_ids.iter().copied().map(TagId).collect();
    let counts = state.backend().batch_vocabulary_tags(&batch, &ids).await?;

    tracing::info!(
        user_id = %user,
        processed = counts.processed_count,
        failed = counts.failed_count,
        "Vocabulary tag batch applied"
    );
    Ok(ApiResponse::ok(counts))
}

// ============================================================================
// Cross-kind Handlers
// ============================================================================

/// GET /tags/search?q=&type=all&limit=20 - Ranked search.
async fn search_tags(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    QueryParams(params): QueryParams<SearchParams>,
) -> ApiResult<ApiResponse<SearchResults>> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::validation("search query q must not be empty"));
    }
    let kind = optional_kind(params.kind.as_deref())?;
    let limit = search_limit(params.limit.as_deref());

    let tags = state.backend().search_tags(query, kind).await?;
    let items = rank(tags, query, limit);

    Ok(ApiResponse::ok(SearchResults {
        query: query.to_string(),
        total: items.len(),
        items,
    }))
}

/// POST /tags/merge - Move source's relations onto target, delete source.
async fn merge_tags(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<MergeRequest>,
) -> ApiResult<ApiResponse<MergeOutcome>> {
    if request.source_tag_id == request.target_tag_id {
        return Err(ApiError::validation_with(
            "a tag cannot be merged into itself",
            json!({ "source_tag_id": request.source_tag_id, "target_tag_id": request.target_tag_id }),
        ));
    }

    let outcome = state
        .backend()
        .merge_tags(TagId(request.source_tag_id), TagId(request.target_tag_id))
        .await?;

    tracing::info!(
        user_id = %user,
        source_tag_id = outcome.source_tag_id,
        target_tag_id = outcome.target_tag_id,
        merged = outcome.merged_count,
        "Tags merged"
    );
    Ok(ApiResponse::ok(outcome).with_message("tags merged"))
}

/// GET /tags/popular?limit=10&time_range=month&type= - Most used in a window.
async fn popular_tags(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    QueryParams(params): QueryParams<PopularParams>,
) -> ApiResult<ApiResponse<Vec<Tag>>> {
    let kind = optional_kind(params.kind.as_deref())?;
    let limit = popular_limit(params.limit.as_deref());
    let range = params
        .time_range
        .as_deref()
        .map(TimeRange::parse_or_default)
        .unwrap_or_default();

    let tags = state
        .backend()
        .popular_tags(kind, range.since(Utc::now()), limit)
        .await?;
    Ok(ApiResponse::ok(tags))
}

/// GET /tags/statistics - Totals and most used tag per kind.
async fn tag_statistics(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> ApiResult<ApiResponse<TagStatistics>> {
    Ok(ApiResponse::ok(state.backend().tag_statistics().await?))
}

// ============================================================================
// Routers
// ============================================================================

fn kind_routes(kind: TagKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route("/{tag_id}", get(get_tag).put(update_tag).delete(delete_tag))
        .layer(Extension(kind))
}

/// Build tag routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tags/search", get(search_tags))
        .route("/tags/merge", post(merge_tags))
        .route("/tags/popular", get(popular_tags))
        .route("/tags/statistics", get(tag_statistics))
        .route("/tags/vocabulary/batch", post(batch_vocabulary_tags))
        .nest("/tags/document", kind_routes(TagKind::Document))
        .nest("/tags/vocabulary", kind_routes(TagKind::Vocabulary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, description: Option<&str>) -> Tag {
        Tag {
            tag_id: 1,
            kind: TagKind::Document,
            name: name.to_string(),
            color: None,
            description: description.map(str::to_string),
            usage_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#1890ff"));
        assert!(is_hex_color("#ABCDEF"));
        assert!(!is_hex_color("1890ff"));
        assert!(!is_hex_color("#18g0ff"));
        assert!(!is_hex_color("#fff"));
    }

    #[test]
    fn popular_limit_falls_back_to_ten() {
        assert_eq!(popular_limit(None), 10);
        assert_eq!(popular_limit(Some("25")), 25);
        assert_eq!(popular_limit(Some("0")), 10);
        assert_eq!(popular_limit(Some("51")), 10);
        assert_eq!(popular_limit(Some("many")), 10);
    }

    #[test]
    fn ranking_orders_by_relevance_then_name() {
        let tags = vec![
            tag("Syntax", Some("grammar rules")),
            tag("grammar", None),
            tag("English grammar", None),
            tag("Advanced grammar", None),
            tag("Idioms", None),
        ];
        let hits = rank(tags, "Grammar", 10);
        let names: Vec<&str> = hits.iter().map(|h| h.tag.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["grammar", "Advanced grammar", "English grammar", "Syntax"]
        );
        assert_eq!(hits[3].relevance, 0.3);
    }

    #[test]
    fn update_needs_a_field() {
        assert!(tag_changes(UpdateTagRequest::default()).is_err());
        let changes = tag_changes(UpdateTagRequest {
            name: Some("  Verbs ".to_string()),
            ..UpdateTagRequest::default()
        })
        .unwrap();
        assert_eq!(changes.name.as_deref(), Some("Verbs"));
    }

    #[test]
    fn kind_filter() {
        assert_eq!(optional_kind(Some("all")).unwrap(), None);
        assert_eq!(
            optional_kind(Some("vocabulary")).unwrap(),
            Some(TagKind::Vocabulary)
        );
        assert!(optional_kind(Some("notes")).is_err());
    }
}
