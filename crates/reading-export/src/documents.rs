//! Document export, optionally with the documents' notes and highlights.

use chrono::{DateTime, Utc};
use reading_core::{Document, ExportFormat, ExportKind, Highlight, Note};
use serde::Serialize;

use crate::error::{ensure_supported, RenderResult};
use crate::layout::{opt, or_dash, timestamp, Csv, HtmlPage, TextReport};

#[derive(Debug, Clone, Copy)]
pub struct DocumentsExport<'a> {
    pub documents: &'a [Document],
    pub notes: &'a [Note],
    pub highlights: &'a [Highlight],
}

#[derive(Serialize)]
struct DocumentsJson<'a> {
    exported_at: DateTime<Utc>,
    total_documents: usize,
    total_notes: usize,
    total_highlights: usize,
    documents: &'a [Document],
    notes: &'a [Note],
    highlights: &'a [Highlight],
}

impl DocumentsExport<'_> {
    pub fn render(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        ensure_supported(ExportKind::Documents, format)?;
        match format {
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(&DocumentsJson {
                exported_at,
                total_documents: self.documents.len(),
                total_notes: self.notes.len(),
                total_highlights: self.highlights.len(),
                documents: self.documents,
                notes: self.notes,
                highlights: self.highlights,
            })?),
            ExportFormat::Csv => Ok(self.csv()),
            ExportFormat::Html => Ok(self.html(exported_at)),
            _ => Ok(self.text(exported_at)),
        }
    }

    fn csv(&self) -> Vec<u8> {
        let mut csv = Csv::new();
        csv.row(["Document ID", "Title", "Author", "Description", "Page Count", "Created At"]);
        for doc in self.documents {
            csv.row([
                doc.document_id.to_string(),
                doc.title.clone(),
                opt(doc.author.as_deref()),
                opt(doc.description.as_deref()),
                opt(doc.page_count),
                timestamp(doc.created_at),
            ]);
        }

        if !self.notes.is_empty() {
            csv.blank();
            csv.row(["Note ID", "Document ID", "Page", "Content", "Created At"]);
            for note in self.notes {
                csv.row([
                    note.note_id.to_string(),
                    note.document_id.to_string(),
                    opt(note.page_number),
                    note.content.clone(),
                    timestamp(note.created_at),
                ]);
            }
        }

        if !self.highlights.is_empty() {
            csv.blank();
            csv.row(["Highlight ID", "Document ID", "Page", "Text", "Color"]);
            for highlight in self.highlights {
                csv.row([
                    highlight.highlight_id.to_string(),
                    highlight.document_id.to_string(),
                    opt(highlight.page_number),
                    highlight.text_content.clone(),
                    opt(highlight.color.as_deref()),
                ]);
            }
        }

        csv.into_bytes()
    }

    fn html(&self, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut page = HtmlPage::new("Document Export", exported_at);
        page.meta("Documents", &self.documents.len().to_string());

        for doc in self.documents {
            page.open_item();
            page.heading(2, &doc.title);
            if let Some(author) = &doc.author {
                page.meta("Author", author);
            }
            if let Some(pages) = doc.page_count {
                page.meta("Pages", &pages.to_string());
            }
            if let Some(description) = &doc.description {
                page.paragraph(description);
            }

            let notes: Vec<Vec<String>> = self
                .notes
                .iter()
                .filter(|n| n.document_id == doc.document_id)
                .map(|n| vec![opt(n.page_number), n.content.clone()])
                .collect();
            if !notes.is_empty() {
                page.heading(3, "Notes");
                page.table(&["Page", "Note"], notes);
            }

            let highlights: Vec<Vec<String>> = self
                .highlights
                .iter()
                .filter(|h| h.document_id == doc.document_id)
                .map(|h| vec![opt(h.page_number), h.text_content.clone()])
                .collect();
            if !highlights.is_empty() {
                page.heading(3, "Highlights");
                page.table(&["Page", "Text"], highlights);
            }
            page.close_item();
        }

        page.into_bytes()
    }

    fn text(&self, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut report = TextReport::new("Document Export", exported_at);
        report.field("Documents", self.documents.len());
        report.field("Notes", self.notes.len());
        report.field("Highlights", self.highlights.len());

        for (index, doc) in self.documents.iter().enumerate() {
            report.section(&format!("{}. {}", index + 1, doc.title));
            report.field("Author", or_dash(doc.author.as_deref()));
            report.field("Pages", or_dash(doc.page_count));
            report.field("Created", timestamp(doc.created_at));
            if let Some(description) = &doc.description {
                report.field("Description", description);
            }

            for note in self.notes.iter().filter(|n| n.document_id == doc.document_id) {
                report.line(format!("  [note p.{}] {}", or_dash(note.page_number), note.content));
            }
            for highlight in self
                .highlights
                .iter()
                .filter(|h| h.document_id == doc.document_id)
            {
                report.line(format!(
                    "  [highlight p.{}] {}",
                    or_dash(highlight.page_number),
                    highlight.text_content
                ));
            }
        }

        report.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: i64, title: &str) -> Document {
        Document {
            document_id: id,
            title: title.to_string(),
            author: Some("Austen".to_string()),
            description: None,
            file_path: None,
            file_size: None,
            page_count: Some(320),
            reading_progress: Some(0.5),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_document() {
        let docs = [document(1, "Emma"), document(2, "Persuasion, revised")];
        let export = DocumentsExport {
            documents: &docs,
            notes: &[],
            highlights: &[],
        };
        let csv = String::from_utf8(export.render(ExportFormat::Csv, Utc::now()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Document ID,Title,Author,Description,Page Count,Created At");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("2,\"Persuasion, revised\",Austen,,320,"));
    }

    #[test]
    fn json_reports_totals() {
        let docs = [document(1, "Emma")];
        let export = DocumentsExport {
            documents: &docs,
            notes: &[],
            highlights: &[],
        };
        let bytes = export.render(ExportFormat::Json, Utc::now()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["total_documents"], 1);
        assert_eq!(json["total_notes"], 0);
        assert_eq!(json["documents"][0]["title"], "Emma");
    }

    #[test]
    fn pdf_is_a_text_report() {
        let docs = [document(1, "Emma")];
        let export = DocumentsExport {
            documents: &docs,
            notes: &[],
            highlights: &[],
        };
        let text = String::from_utf8(export.render(ExportFormat::Pdf, Utc::now()).unwrap()).unwrap();
        assert!(text.starts_with("Document Export\n===============\n"));
        assert!(text.contains("1. Emma"));
    }

    #[test]
    fn zip_is_rejected() {
        let export = DocumentsExport {
            documents: &[],
            notes: &[],
            highlights: &[],
        };
        assert!(export.render(ExportFormat::Zip, Utc::now()).is_err());
    }
}
