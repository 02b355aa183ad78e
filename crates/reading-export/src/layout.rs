//! Builders for the three textual layouts every renderer shares.
//!
//! Values passed in are raw; the builders apply CSV quoting and HTML
//! escaping so no renderer interpolates unescaped data.

use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::escape::{csv_field, html_escape};

/// Timestamp layout used in reports and CSV cells.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn opt_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(timestamp).unwrap_or_default()
}

/// Display an optional value, empty when absent.
pub fn opt<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Display an optional value, `-` when absent. Used in text reports.
pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// CSV
// ============================================================================

#[derive(Debug, Default)]
pub struct Csv {
    out: String,
    rows: usize,
}

impl Csv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.out.push(',');
            }
            first = false;
            self.out.push_str(&csv_field(field.as_ref()));
        }
        self.out.push('\n');
        self.rows += 1;
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Rows written so far, headers included.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out.into_bytes()
    }
}

// ============================================================================
// HTML
// ============================================================================

const STYLE: &str = "body{font-family:sans-serif;margin:2em;line-height:1.6}\
table{border-collapse:collapse;width:100%;margin:1em 0}\
th,td{border:1px solid #ddd;padding:6px;text-align:left}\
th{background:#f5f5f5}.meta{color:#666}\
.item{border-left:3px solid #1890ff;padding-left:1em;margin:1em 0}";

#[derive(Debug)]
pub struct HtmlPage {
    title: String,
    body: String,
}

impl HtmlPage {
    pub fn new(title: &str, exported_at: DateTime<Utc>) -> Self {
        let mut page = Self {
            title: title.to_string(),
            body: String::new(),
        };
        page.heading(1, title);
        page.meta("Exported at", &timestamp(exported_at));
        page
    }

    pub fn heading(&mut self, level: u8, text: &str) {
        let level = level.clamp(1, 6);
        self.body
            .push_str(&format!("<h{level}>{}</h{level}>\n", html_escape(text)));
    }

    pub fn paragraph(&mut self, text: &str) {
        self.body
            .push_str(&format!("<p>{}</p>\n", html_escape(text)));
    }

    pub fn meta(&mut self, label: &str, value: &str) {
        self.body.push_str(&format!(
            "<p class=\"meta\"><strong>{}:</strong> {}</p>\n",
            html_escape(label),
            html_escape(value)
        ));
    }

    /// Open a bordered block; every `open_item` needs a `close_item`.
    pub fn open_item(&mut self) {
        self.body.push_str("<div class=\"item\">\n");
    }

    pub fn close_item(&mut self) {
        self.body.push_str("</div>\n");
    }

    pub fn table<R>(&mut self, headers: &[&str], rows: R)
    where
        R: IntoIterator<Item = Vec<String>>,
    {
        self.body.push_str("<table>\n<tr>");
        for header in headers {
            self.body
                .push_str(&format!("<th>{}</th>", html_escape(header)));
        }
        self.body.push_str("</tr>\n");
        for row in rows {
            self.body.push_str("<tr>");
            for cell in row {
                self.body
                    .push_str(&format!("<td>{}</td>", html_escape(&cell)));
            }
            self.body.push_str("</tr>\n");
        }
        self.body.push_str("</table>\n");
    }

    pub fn into_bytes(self) -> Vec<u8> {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n\
             <style>{STYLE}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            html_escape(&self.title),
            self.body
        )
        .into_bytes()
    }
}

// ============================================================================
// Plain-text report
// ============================================================================

/// Plain-text report used for txt and for the pdf/xlsx/docx extensions.
#[derive(Debug)]
pub struct TextReport {
    out: String,
}

impl TextReport {
    pub fn new(title: &str, exported_at: DateTime<Utc>) -> Self {
        let mut report = Self { out: String::new() };
        report.line(title);
        report.line("=".repeat(title.chars().count()));
        report.field("Exported at", timestamp(exported_at));
        report.blank();
        report
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    pub fn field(&mut self, label: &str, value: impl Display) {
        self.out.push_str(&format!("{label}: {value}\n"));
    }

    pub fn section(&mut self, title: &str) {
        self.blank();
        self.line(title);
        self.line("-".repeat(title.chars().count()));
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out.into_bytes()
    }
}
