//! Error types for export rendering.

use reading_core::{ExportFormat, ExportKind};
use thiserror::Error;

/// Result type alias for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The kind has no renderer for this format.
    #[error("{kind} exports cannot be rendered as {format}")]
    UnsupportedFormat {
        kind: ExportKind,
        format: ExportFormat,
    },

    /// JSON serialization failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error while writing an archive entry.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reject a format outside the kind's allow-list.
pub(crate) fn ensure_supported(kind: ExportKind, format: ExportFormat) -> RenderResult<()> {
    if kind.supports(format) {
        Ok(())
    } else {
        Err(RenderError::UnsupportedFormat { kind, format })
    }
}
