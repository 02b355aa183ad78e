//! Success envelopes and file downloads.

use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reading_core::ExportId;
use serde::Serialize;

/// Response header carrying the audit id of a completed export.
pub const EXPORT_ID_HEADER: &str = "x-export-id";

/// `{"success": true, "message"?, "data"}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            status: StatusCode::OK,
        }
    }

    /// 201 Created.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Rendered export sent as an attachment.
#[derive(Debug)]
pub struct FileDownload {
    pub filename: String,
    pub content_type: &'static str,
    pub export_id: ExportId,
    pub bytes: Vec<u8>,
}

impl IntoResponse for FileDownload {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
                (
                    HeaderName::from_static(EXPORT_ID_HEADER),
                    self.export_id.to_string(),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_core::ExportKind;

    #[test]
    fn created_envelope_uses_201() {
        let response = ApiResponse::created(serde_json::json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn download_sets_attachment_headers() {
        let export_id = ExportId::mint(ExportKind::Notes);
        let response = FileDownload {
            filename: "notes_2024-01-01_00-00-00.txt".to_string(),
            content_type: "text/plain",
            export_id: export_id.clone(),
            bytes: b"hello".to_vec(),
        }
        .into_response();

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"notes_2024-01-01_00-00-00.txt\""
        );
        assert_eq!(headers[EXPORT_ID_HEADER], export_id.as_str());
    }
}
