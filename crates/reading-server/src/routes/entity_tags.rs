//! Tags on documents and vocabulary entries.
//!
//! - GET /{documents|vocabulary}/{entity_id}/tags - Tags on one entity
//! - POST /{documents|vocabulary}/{entity_id}/tags/{tag_id} - Attach
//! - DELETE /{documents|vocabulary}/{entity_id}/tags/{tag_id} - Detach
//! - POST /documents/tags/batch - Add, remove or replace tags on many documents

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use reading_core::{Tag, TagId, TagKind};
use reading_store::{BatchOperation, BatchTagOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody, PathParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Most documents one batch request may touch.
pub const MAX_BATCH_DOCUMENTS: usize = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EntityTags {
    pub entity_id: i64,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub struct TagRelation {
    pub tag_id: i64,
    pub entity_id: i64,
    /// `false` when the relation already existed.
    pub created: bool,
}

/// Request body for POST /documents/tags/batch.
#[derive(Debug, Deserialize)]
pub struct DocumentTagBatchRequest {
    #[serde(default)]
    pub document_ids: Vec<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    pub operation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentTagBatchResponse {
    pub operation: BatchOperation,
    #[serde(flatten)]
    pub outcome: BatchTagOutcome,
}

fn batch_operation(raw: Option<&str>) -> ApiResult<BatchOperation> {
    match raw {
        None => Ok(BatchOperation::default()),
        Some(value) => BatchOperation::parse(value).ok_or_else(|| {
            ApiError::validation_with(
                format!("unknown operation {value:?}"),
                json!({ "operation": value, "supported_operations": ["add", "remove", "replace"] }),
            )
        }),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /{kind}/{entity_id}/tags - Tags on one of the caller's entities.
async fn list_entity_tags(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(user): AuthUser,
    PathParams(entity_id): PathParams<i64>,
) -> ApiResult<ApiResponse<EntityTags>> {
    let tags = state
        .backend()
        .tags_for_entity(user, kind, entity_id)
        .await?;
    Ok(ApiResponse::ok(EntityTags { entity_id, tags }))
}

/// POST /{kind}/{entity_id}/tags/{tag_id} - Attach; repeating is a no-op.
async fn attach_tag(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(user): AuthUser,
    PathParams((entity_id, tag_id)): PathParams<(i64, i64)>,
) -> ApiResult<ApiResponse<TagRelation>> {
    let created = state
        .backend()
        .attach_tag(user, kind, TagId(tag_id), entity_id)
        .await?;

    tracing::info!(user_id = %user, %kind, entity_id, tag_id, created, "Tag attached");
    let message = if created {
        "tag attached"
    } else {
        "tag already attached"
    };
    Ok(ApiResponse::ok(TagRelation {
        tag_id,
        entity_id,
        created,
    })
    .with_message(message))
}

/// DELETE /{kind}/{entity_id}/tags/{tag_id} - Detach.
async fn detach_tag(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    AuthUser(user): AuthUser,
    PathParams((entity_id, tag_id)): PathParams<(i64, i64)>,
) -> ApiResult<ApiResponse<TagRelation>> {
    state
        .backend()
        .detach_tag(user, kind, TagId(tag_id), entity_id)
        .await?;

    tracing::info!(user_id = %user, %kind, entity_id, tag_id, "Tag detached");
    Ok(ApiResponse::ok(TagRelation {
        tag_id,
        entity_id,
        created: false,
    })
    .with_message("tag detached"))
}

/// POST /documents/tags/batch - One operation over many documents, applied
/// atomically.
async fn batch_document_tags(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<DocumentTagBatchRequest>,
) -> ApiResult<ApiResponse<DocumentTagBatchResponse>> {
    let operation = batch_operation(request.operation.as_deref())?;
    if request.document_ids.is_empty() || request.document_ids.len() > MAX_BATCH_DOCUMENTS {
        return Err(ApiError::validation_with(
            format!("document_ids must contain 1-{MAX_BATCH_DOCUMENTS} ids"),
            json!({ "field": "document_ids", "requested": request.document_ids.len() }),
        ));
    }
    if request.tag_ids.is_empty() && operation != BatchOperation::Replace {
        return Err(ApiError::validation_with(
            "tag_ids must not be empty",
            json!({ "field": "tag_ids" }),
        ));
    }

    let tags: Vec<TagId> = request.tag_ids.iter().copied().map(TagId).collect();
    let outcome = state
        .backend()
        .apply_document_tags(user, operation, &request.document_ids, &tags)
        .await?;

    tracing::info!(
        user_id = %user,
        ?operation,
        documents = outcome.processed_documents,
        added = outcome.relations_added,
        removed = outcome.relations_removed,
        "Document tag batch applied"
    );
    Ok(ApiResponse::ok(DocumentTagBatchResponse { operation, outcome }))
}

// ============================================================================
// Routers
// ============================================================================

fn kind_routes(kind: TagKind) -> Router<AppState> {
    Router::new()
        .route("/{entity_id}/tags", get(list_entity_tags))
        .route(
            "/{entity_id}/tags/{tag_id}",
            post(attach_tag).delete(detach_tag),
        )
        .layer(Extension(kind))
}

/// Build entity tagging routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents/tags/batch", post(batch_document_tags))
        .nest("/documents", kind_routes(TagKind::Document))
        .nest("/vocabulary", kind_routes(TagKind::Vocabulary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_defaults_to_replace() {
        assert_eq!(batch_operation(None).unwrap(), BatchOperation::Replace);
        assert_eq!(batch_operation(Some("Add")).unwrap(), BatchOperation::Add);
        let err = batch_operation(Some("toggle")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
