//! Built-in export templates.
//!
//! These are never stored; they are listed ahead of user templates on every
//! request.

use chrono::{DateTime, Duration, Utc};
use reading_core::ExportTemplate;
use serde_json::{json, Value};

struct SystemTemplate {
    id: &'static str,
    name: &'static str,
    export_type: &'static str,
    format: &'static str,
    description: &'static str,
    is_default: bool,
    age_days: i64,
    config: fn() -> Value,
}

static SYSTEM_TEMPLATES: [SystemTemplate; 6] = [
    SystemTemplate {
        id: "system_doc_pdf_default",
        name: "Standard PDF document",
        export_type: "documents",
        format: "pdf",
        description: "A4 pages with header, footer and page numbers",
        is_default: true,
        age_days: 30,
        config: || {
            json!({
                "pageSize": "A4",
                "margin": "2cm",
                "fontSize": "12pt",
                "includeHeader": true,
                "includeFooter": true,
                "watermark": false,
                "pageNumbers": true
            })
        },
    },
    SystemTemplate {
        id: "system_doc_docx_default",
        name: "Word document",
        export_type: "documents",
        format: "docx",
        description: "Editable document with a table of contents",
        is_default: false,
        age_days: 25,
        config: || {
            json!({
                "fontFamily": "Calibri",
                "fontSize": "11pt",
                "lineSpacing": "1.5",
                "includeToc": true,
                "headerLevels": 3
            })
        },
    },
    SystemTemplate {
        id: "system_vocab_xlsx_default",
        name: "Vocabulary spreadsheet",
        export_type: "vocabulary",
        format: "xlsx",
        description: "Word list with phonetics, examples and tags",
        is_default: true,
        age_days: 20,
        config: || {
            json!({
                "includePhonetic": true,
                "includeExamples": true,
                "includeTags": true,
                "includeStatistics": false,
                "autoFilter": true,
                "freezeHeader": true,
                "columnWidth": {
                    "word": 15,
                    "phonetic": 12,
                    "meaning": 25,
                    "partOfSpeech": 10
                }
            })
        },
    },
    SystemTemplate {
        id: "system_review_csv_default",
        name: "Review records CSV",
        export_type: "reviews",
        format: "csv",
        description: "Comma-separated review sessions with a header row",
        is_default: true,
        age_days: 15,
        config: || {
            json!({
                "delimiter": ",",
                "includeHeader": true,
                "dateFormat": "yyyy-MM-dd HH:mm:ss",
                "encoding": "UTF-8"
            })
        },
    },
    SystemTemplate {
        id: "system_stats_pdf_default",
        name: "Learning report",
        export_type: "statistics",
        format: "pdf",
        description: "Portrait report with line charts",
        is_default: true,
        age_days: 10,
        config: || {
            json!({
                "pageSize": "A4",
                "orientation": "portrait",
                "includeCharts": true,
                "chartType": "line",
                "colorScheme": "blue"
            })
        },
    },
    SystemTemplate {
        id: "system_notes_html_default",
        name: "Notes web page",
        export_type: "notes",
        format: "html",
        description: "Responsive light-theme page",
        is_default: true,
        age_days: 5,
        config: || {
            json!({
                "theme": "light",
                "fontSize": "14px",
                "lineHeight": "1.6",
                "includeCss": true,
                "responsive": true
            })
        },
    },
];

/// The six built-in templates, optionally restricted to one export type.
/// Creation times are staggered back from `now`.
pub fn system_templates(now: DateTime<Utc>, export_type: Option<&str>) -> Vec<ExportTemplate> {
    SYSTEM_TEMPLATES
        .iter()
        .filter(|t| export_type.is_none_or(|wanted| wanted == t.export_type))
        .map(|t| {
            let created_at = now - Duration::days(t.age_days);
            ExportTemplate {
                template_id: t.id.to_string(),
                user_id: None,
                name: t.name.to_string(),
                export_type: t.export_type.to_string(),
                format: t.format.to_string(),
                description: Some(t.description.to_string()),
                config: (t.config)(),
                is_default: t.is_default,
                is_public: true,
                is_system: true,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_core::{ExportFormat, ExportKind};

    #[test]
    fn six_public_system_templates() {
        let templates = system_templates(Utc::now(), None);
        assert_eq!(templates.len(), 6);
        assert!(templates.iter().all(|t| t.is_system && t.is_public && t.user_id.is_none()));
        assert_eq!(templates[0].template_id, "system_doc_pdf_default");
        assert!(!templates[1].is_default);
        assert_eq!(templates[2].config["columnWidth"]["meaning"], 25);
    }

    #[test]
    fn filter_by_type() {
        let documents = system_templates(Utc::now(), Some("documents"));
        assert_eq!(documents.len(), 2);
        assert!(system_templates(Utc::now(), Some("anki")).is_empty());
    }

    #[test]
    fn templates_use_allowed_formats() {
        for t in system_templates(Utc::now(), None) {
            let kind: ExportKind = t.export_type.parse().unwrap();
            let format: ExportFormat = t.format.parse().unwrap();
            assert!(kind.supports(format), "{}", t.template_id);
        }
    }
}
