//! Note export. HTML and text output group notes by document.

use chrono::{DateTime, Utc};
use reading_core::{ExportFormat, ExportKind, Note};
use serde::Serialize;

use crate::error::{ensure_supported, RenderResult};
use crate::layout::{or_dash, timestamp, HtmlPage, TextReport};

#[derive(Debug, Clone, Copy)]
pub struct NotesExport<'a> {
    pub notes: &'a [Note],
}

#[derive(Serialize)]
struct NotesJson<'a> {
    exported_at: DateTime<Utc>,
    total_notes: usize,
    notes: &'a [Note],
}

/// Consecutive runs of notes sharing a document. Input is ordered by
/// document, so each document forms one run.
fn by_document(notes: &[Note]) -> Vec<(i64, &str, Vec<&Note>)> {
    let mut groups: Vec<(i64, &str, Vec<&Note>)> = Vec::new();
    for note in notes {
        match groups.last_mut() {
            Some((document_id, _, members)) if *document_id == note.document_id => {
                members.push(note)
            }
            _ => groups.push((
                note.document_id,
                note.document_title.as_deref().unwrap_or("Untitled document"),
                vec![note],
            )),
        }
    }
    groups
}

impl NotesExport<'_> {
    pub fn render(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        ensure_supported(ExportKind::Notes, format)?;
        match format {
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(&NotesJson {
                exported_at,
                total_notes: self.notes.len(),
                notes: self.notes,
            })?),
            ExportFormat::Html => Ok(self.html(exported_at)),
            _ => Ok(self.text(exported_at)),
        }
    }

    fn html(&self, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut page = HtmlPage::new("Reading Notes", exported_at);
        page.meta("Notes", &self.notes.len().to_string());

        for (_, title, notes) in by_document(self.notes) {
            page.heading(2, title);
            for note in notes {
                page.open_item();
                page.meta(
                    "Page",
                    &note
                        .page_number
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                page.paragraph(&note.content);
                page.meta("Created", &timestamp(note.created_at));
                page.close_item();
            }
        }

        page.into_bytes()
    }

    fn text(&self, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut report = TextReport::new("Reading Notes", exported_at);
        report.field("Notes", self.notes.len());

        for (document_id, title, notes) in by_document(self.notes) {
            report.section(&format!("{title} (document {document_id})"));
            for note in notes {
                report.line(format!(
                    "[p.{}] {}",
                    or_dash(note.page_number),
                    note.content
                ));
                report.line(format!("    {}", timestamp(note.created_at)));
            }
        }

        report.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, document_id: i64, title: &str, content: &str) -> Note {
        Note {
            note_id: id,
            document_id,
            document_title: Some(title.to_string()),
            page_number: Some(3),
            content: content.to_string(),
            highlight_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn notes_group_by_document() {
        let notes = [
            note(1, 5, "Emma", "first"),
            note(2, 5, "Emma", "second"),
            note(3, 9, "Dracula", "third"),
        ];
        let groups = by_document(&notes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, "Emma");
        assert_eq!(groups[0].2.len(), 2);
        assert_eq!(groups[1].0, 9);
    }

    #[test]
    fn html_escapes_note_content() {
        let notes = [note(1, 5, "Emma & Co", "<i>irony</i>")];
        let export = NotesExport { notes: &notes };
        let html = String::from_utf8(export.render(ExportFormat::Html, Utc::now()).unwrap()).unwrap();

        assert!(html.contains("<h2>Emma &amp; Co</h2>"));
        assert!(html.contains("&lt;i&gt;irony&lt;/i&gt;"));
    }

    #[test]
    fn csv_is_not_offered() {
        let export = NotesExport { notes: &[] };
        assert!(export.render(ExportFormat::Csv, Utc::now()).is_err());
    }
}
