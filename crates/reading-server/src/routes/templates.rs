//! Export templates and the format catalog.
//!
//! - POST /export/templates - Save a template
//! - GET /export/templates - System templates, then the caller's and public ones
//! - GET /export/formats - Formats per export type

use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Router};
use chrono::Utc;
use reading_core::{ExportFormat, ExportKind, ExportTemplate, UserId};
use reading_export::{format_catalog, system_templates, FormatInfo};
use reading_store::NewTemplate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody, QueryParams};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validate;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /export/templates.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub export_type: String,
    pub format: String,
    pub description: Option<String>,
    #[serde(default = "empty_object")]
    pub config: Value,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_public: bool,
}

fn empty_object() -> Value {
    json!({})
}

/// Query with an optional export type filter.
#[derive(Debug, Deserialize)]
pub struct TypeFilter {
    #[serde(rename = "type")]
    pub export_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateList {
    pub templates: Vec<ExportTemplate>,
    pub total: usize,
}

// ============================================================================
// Validation
// ============================================================================

/// A catalogued export kind, or `VALIDATION_ERROR` naming the choices.
fn catalogued_kind(raw: &str) -> ApiResult<ExportKind> {
    match raw.parse::<ExportKind>() {
        Ok(kind) if ExportKind::CATALOGUED.contains(&kind) => Ok(kind),
        _ => {
            let supported: Vec<&str> = ExportKind::CATALOGUED.iter().map(|k| k.as_str()).collect();
            Err(ApiError::validation_with(
                format!("unknown export type {raw:?}"),
                json!({ "type": raw, "supported_types": supported }),
            ))
        }
    }
}

fn type_filter(filter: &TypeFilter) -> ApiResult<Option<ExportKind>> {
    match filter.export_type.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => catalogued_kind(raw).map(Some),
    }
}

fn new_template(user: UserId, request: CreateTemplateRequest) -> ApiResult<NewTemplate> {
    validate::text_length("name", &request.name, 1, 100)?;
    let kind = catalogued_kind(&request.export_type)?;
    let format: ExportFormat = validate::export_format(kind, Some(&request.format))?;
    if let Some(description) = &request.description {
        validate::text_length("description", description, 0, 500)?;
    }
    if !request.config.is_object() {
        return Err(ApiError::validation("config must be a JSON object"));
    }

    Ok(NewTemplate {
        user_id: user,
        name: request.name.trim().to_string(),
        export_type: kind,
        format: format.as_str().to_string(),
        description: request.description,
        config: request.config,
        is_default: request.is_default,
        is_public: request.is_public,
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /export/templates - Save a template for the caller.
async fn create_template(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CreateTemplateRequest>,
) -> ApiResult<ApiResponse<ExportTemplate>> {
    let template = state
        .backend()
        .create_template(new_template(user, request)?)
        .await?;

    tracing::info!(
        user_id = %user,
        template_id = %template.template_id,
        export_type = %template.export_type,
        "Export template created"
    );

    Ok(ApiResponse::created(template).with_message("template created"))
}

/// GET /export/templates - System templates first, then stored ones.
async fn list_templates(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    QueryParams(filter): QueryParams<TypeFilter>,
) -> ApiResult<ApiResponse<TemplateList>> {
    let kind = type_filter(&filter)?;
    let export_type = kind.map(ExportKind::as_str);

    let mut templates = system_templates(Utc::now(), export_type);
    templates.extend(state.backend().visible_templates(user, export_type).await?);

    Ok(ApiResponse::ok(TemplateList {
        total: templates.len(),
        templates,
    }))
}

/// GET /export/formats - Format catalog, optionally for one type.
async fn list_formats(
    AuthUser(_user): AuthUser,
    QueryParams(filter): QueryParams<TypeFilter>,
) -> ApiResult<ApiResponse<BTreeMap<&'static str, BTreeMap<&'static str, FormatInfo>>>> {
    let kind = type_filter(&filter)?;
    Ok(ApiResponse::ok(format_catalog(kind)))
}

/// Build template and catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export/templates", get(list_templates).post(create_template))
        .route("/export/formats", get(list_formats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, export_type: &str, format: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            export_type: export_type.to_string(),
            format: format.to_string(),
            description: None,
            config: json!({ "pageSize": "A4" }),
            is_default: false,
            is_public: false,
        }
    }

    #[test]
    fn template_name_is_trimmed() {
        let template = new_template(UserId(1), request("  Weekly  ", "notes", "HTML")).unwrap();
        assert_eq!(template.name, "Weekly");
        assert_eq!(template.format, "html");
        assert_eq!(template.export_type, ExportKind::Notes);
    }

    #[test]
    fn template_format_must_fit_type() {
        let err = new_template(UserId(1), request("x", "vocabulary", "html")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(new_template(UserId(1), request("x", "anki", "csv")).is_err());
        assert!(new_template(UserId(1), request("", "notes", "pdf")).is_err());
    }

    #[test]
    fn template_config_must_be_object() {
        let mut body = request("x", "notes", "pdf");
        body.config = json!([1, 2]);
        assert!(new_template(UserId(1), body).is_err());
    }
}
