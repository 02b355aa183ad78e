//! Highlights of a single document.

use chrono::{DateTime, Utc};
use reading_core::{Document, ExportFormat, ExportKind, Highlight};
use serde::Serialize;

use crate::error::{ensure_supported, RenderResult};
use crate::layout::{opt, or_dash, timestamp, Csv, TextReport};

#[derive(Debug, Clone, Copy)]
pub struct HighlightsExport<'a> {
    pub document: &'a Document,
    pub highlights: &'a [Highlight],
}

#[derive(Serialize)]
struct HighlightsJson<'a> {
    exported_at: DateTime<Utc>,
    document_id: i64,
    document_title: &'a str,
    total_highlights: usize,
    highlights: &'a [Highlight],
}

impl HighlightsExport<'_> {
    /// Filename prefix, which carries the document id.
    pub fn file_prefix(&self) -> String {
        format!("{}_{}", ExportKind::Highlights.file_prefix(), self.document.document_id)
    }

    pub fn render(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        ensure_supported(ExportKind::Highlights, format)?;
        match format {
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(&HighlightsJson {
                exported_at,
                document_id: self.document.document_id,
                document_title: &self.document.title,
                total_highlights: self.highlights.len(),
                highlights: self.highlights,
            })?),
            ExportFormat::Csv => {
                let mut csv = Csv::new();
                csv.row([
                    "Highlight ID",
                    "Page",
                    "Text",
                    "Color",
                    "Start",
                    "End",
                    "Created At",
                ]);
                for h in self.highlights {
                    csv.row([
                        h.highlight_id.to_string(),
                        opt(h.page_number),
                        h.text_content.clone(),
                        opt(h.color.as_deref()),
                        opt(h.start_position),
                        opt(h.end_position),
                        timestamp(h.created_at),
                    ]);
                }
                Ok(csv.into_bytes())
            }
            _ => {
                let mut report = TextReport::new(
                    &format!("Highlights: {}", self.document.title),
                    exported_at,
                );
                report.field("Highlights", self.highlights.len());
                report.blank();
                for h in self.highlights {
                    report.line(format!("[p.{}] {}", or_dash(h.page_number), h.text_content));
                }
                Ok(report.into_bytes())
            }
        }
    }
}
