//! Export history routes.
//!
//! - GET /export/history - Paginated audit records
//! - DELETE /export/history/{export_id} - Delete one record
//! - DELETE /export/cleanup - Delete records older than N days
//! - GET /export/stats - Aggregates over the caller's exports

use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use reading_core::{ExportRecord, HistoryQuery, HistorySort, Pagination, SortOrder};
use reading_store::{CleanupSummary, ExportStats};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, PathParams, QueryParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Largest accepted `page_size`.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default age for cleanup when `daysOld` is absent.
pub const DEFAULT_CLEANUP_DAYS: i64 = 30;

/// Oldest cleanup cutoff accepted, in days.
pub const MAX_CLEANUP_DAYS: i64 = 365;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query for GET /export/history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub items: Vec<ExportRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct DeletedRecord {
    pub export_id: String,
    pub filename: Option<String>,
}

/// Query for DELETE /export/cleanup. Kept as text so a non-numeric value
/// gets the same error as an out-of-range one.
#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    #[serde(rename = "daysOld")]
    pub days_old: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    #[serde(flatten)]
    pub summary: CleanupSummary,
    pub cutoff: DateTime<Utc>,
}

// ============================================================================
// Validation
// ============================================================================

fn history_query(params: &HistoryParams) -> ApiResult<HistoryQuery> {
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::validation_with(
            "page must be at least 1",
            json!({ "page": page }),
        ));
    }
    let page_size = params.page_size.unwrap_or(20);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation_with(
            format!("page_size must be between 1 and {MAX_PAGE_SIZE}"),
            json!({ "page_size": page_size }),
        ));
    }

    Ok(HistoryQuery {
        page: u32::try_from(page).unwrap_or(u32::MAX),
        page_size: u32::try_from(page_size).unwrap_or(20),
        sort: params
            .sort_by
            .as_deref()
            .map(HistorySort::parse_or_default)
            .unwrap_or_default(),
        order: params
            .sort_order
            .as_deref()
            .map(SortOrder::parse_or_default)
            .unwrap_or_default(),
    })
}

fn cleanup_days(raw: Option<&str>) -> ApiResult<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_CLEANUP_DAYS);
    };
    match raw.trim().parse::<i64>() {
        Ok(days) if (1..=MAX_CLEANUP_DAYS).contains(&days) => Ok(days),
        _ => Err(ApiError::validation_with(
            format!("daysOld must be between 1 and {MAX_CLEANUP_DAYS}"),
            json!({ "days_old": raw, "valid_range": format!("1-{MAX_CLEANUP_DAYS}") }),
        )),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /export/history - One page of the caller's audit records.
async fn list_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(params): QueryParams<HistoryParams>,
) -> ApiResult<ApiResponse<HistoryPage>> {
    let query = history_query(&params)?;
    let (items, total) = state.backend().list_exports(user, &query).await?;

    Ok(ApiResponse::ok(HistoryPage {
        items,
        pagination: Pagination::new(query.page, query.page_size, total),
    }))
}

/// DELETE /export/history/{export_id} - Delete one audit record.
async fn delete_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathParams(export_id): PathParams<String>,
) -> ApiResult<ApiResponse<DeletedRecord>> {
    let record = state
        .backend()
        .delete_export(user, &export_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                "HISTORY_NOT_FOUND",
                format!("export record {export_id} not found"),
                json!({ "export_id": export_id }),
            )
        })?;

    tracing::info!(user_id = %user, export_id = %record.export_id, "Export record deleted");

    Ok(ApiResponse::ok(DeletedRecord {
        export_id: record.export_id,
        filename: record.filename,
    })
    .with_message("export record deleted"))
}

/// DELETE /export/cleanup - Delete records older than `daysOld` days.
async fn cleanup_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(params): QueryParams<CleanupParams>,
) -> ApiResult<ApiResponse<CleanupResponse>> {
    let days = cleanup_days(params.days_old.as_deref())?;
    let cutoff = Utc::now() - Duration::days(days);

    let summary = state.backend().cleanup_exports(user, cutoff).await?;

    tracing::info!(
        user_id = %user,
        days_old = days,
        deleted = summary.deleted_count,
        freed = summary.freed_space,
        "Export history cleaned up"
    );

    let message = format!("deleted {} export records", summary.deleted_count);
    Ok(ApiResponse::ok(CleanupResponse { summary, cutoff }).with_message(message))
}

/// GET /export/stats - Aggregates over the caller's exports.
async fn export_stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<ApiResponse<ExportStats>> {
    let stats = state.backend().export_stats(user, Utc::now()).await?;
    Ok(ApiResponse::ok(stats))
}

/// Build export history routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export/history", get(list_history))
        .route("/export/history/{export_id}", delete(delete_history))
        .route("/export/cleanup", delete(cleanup_history))
        .route("/export/stats", get(export_stats))
}
