//! API error types with JSON responses.
//!
//! Every failure is answered with
//! `{"success": false, "error": {"code", "message", "details"}}`. Storage,
//! serialization and archive failures are logged in full and reach the
//! client only as an opaque `INTERNAL_ERROR`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reading_export::RenderError;
use reading_store::StoreError;
use serde::Serialize;
use serde_json::{json, Value};

const INTERNAL_MESSAGE: &str = "internal server error";

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid input (400).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Missing or foreign resource (404) with a resource-specific code.
    #[error("{message}")]
    NotFound {
        code: &'static str,
        message: String,
        details: Value,
    },

    /// Missing, malformed or expired session (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Recognised but unsupported option (501).
    #[error("{0}")]
    FeatureNotAvailable(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rendering error.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: json!({}),
        }
    }

    pub fn validation_with(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
            details,
        }
    }

    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { code, .. } => code,
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::FeatureNotAvailable(_) => "FEATURE_NOT_AVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(e) => match e {
                StoreError::TagNotFound(_) | StoreError::TagsNotFound(_) => "TAG_NOT_FOUND",
                StoreError::DuplicateTagName { .. } | StoreError::TemplateNameTaken(_) => {
                    "CONFLICT"
                }
                StoreError::TagInUse { .. } => "TAG_IN_USE",
                StoreError::TagKindMismatch { .. } => "VALIDATION_ERROR",
                StoreError::EntityNotFound { kind, .. }
                | StoreError::EntitiesNotFound { kind, .. } => kind.entity_not_found_code(),
                StoreError::RelationNotFound { .. } => "RELATION_NOT_FOUND",
                _ => "INTERNAL_ERROR",
            },
            Self::Render(e) => match e {
                RenderError::UnsupportedFormat { .. } => "VALIDATION_ERROR",
                _ => "INTERNAL_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.code() {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "CONFLICT" | "TAG_IN_USE" => StatusCode::CONFLICT,
            "FEATURE_NOT_AVAILABLE" => StatusCode::NOT_IMPLEMENTED,
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::NOT_FOUND,
        }
    }

    /// Structured details for the client.
    pub fn details(&self) -> Value {
        match self {
            Self::Validation { details, .. } | Self::NotFound { details, .. } => details.clone(),
            Self::Store(e) => match e {
                StoreError::TagNotFound(id) => json!({ "tag_id": id }),
                StoreError::TagsNotFound(ids) => json!({ "tag_ids": ids }),
                StoreError::DuplicateTagName { kind, name } => {
                    json!({ "kind": kind, "name": name })
                }
                StoreError::TagInUse {
                    tag_id,
                    usage_count,
                } => json!({ "tag_id": tag_id, "usage_count": usage_count }),
                StoreError::TagKindMismatch {
                    source_tag,
                    target_tag,
                } => json!({ "source_tag_id": source_tag, "target_tag_id": target_tag }),
                StoreError::EntityNotFound { kind, id } => {
                    json!({ "kind": kind, "entity_id": id })
                }
                StoreError::EntitiesNotFound { kind, ids } => {
                    json!({ format!("{kind}_ids"): ids })
                }
                StoreError::RelationNotFound { tag_id, entity_id } => {
                    json!({ "tag_id": tag_id, "entity_id": entity_id })
                }
                StoreError::TemplateNameTaken(name) => json!({ "name": name }),
                _ => json!({}),
            },
            _ => json!({}),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable context, e.g. the offending ids.
    pub details: Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, details) = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            (INTERNAL_MESSAGE.to_string(), json!({}))
        } else {
            (self.to_string(), self.details())
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorDetails {
                code: self.code().to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reading_core::TagKind;

    #[test]
    fn store_errors_map_to_codes_and_statuses() {
        let in_use = ApiError::from(StoreError::TagInUse {
            tag_id: 4,
            usage_count: 2,
        });
        assert_eq!(in_use.code(), "TAG_IN_USE");
        assert_eq!(in_use.status_code(), StatusCode::CONFLICT);
        assert_eq!(in_use.details()["usage_count"], 2);

        let missing = ApiError::from(StoreError::EntitiesNotFound {
            kind: TagKind::Document,
            ids: vec![7, 9],
        });
        assert_eq!(missing.code(), "DOCUMENT_NOT_FOUND");
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.details()["document_ids"], json!([7, 9]));

        let duplicate = ApiError::from(StoreError::DuplicateTagName {
            kind: TagKind::Vocabulary,
            name: "verbs".to_string(),
        });
        assert_eq!(duplicate.code(), "CONFLICT");
    }

    #[test]
    fn backend_failures_are_internal() {
        let err = ApiError::from(StoreError::ConfigError("pool exhausted".to_string()));
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details(), json!({}));
    }

    #[test]
    fn feature_not_available_is_501() {
        let err = ApiError::FeatureNotAvailable("encrypted exports".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.code(), "FEATURE_NOT_AVAILABLE");
    }
}
