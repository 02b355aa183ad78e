//! Export formats, export kinds and tag kinds.
//!
//! Each export kind carries a fixed allow-list of formats, an optional upper
//! bound on the number of ids a single request may name, the prefix used for
//! generated filenames, and the entity type written to the audit log. The
//! first format in each allow-list is the recommended one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised when parsing format, kind or tag-kind names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown export format: {0}")]
    Format(String),

    #[error("unknown export type: {0}")]
    Kind(String),

    #[error("unknown tag kind: {0}")]
    TagKind(String),
}

// ============================================================================
// Export Format
// ============================================================================

/// Output format of an export.
///
/// Only `json`, `csv`, `html` and `zip` have their own encoders. `pdf`,
/// `xlsx`, `docx` and `txt` are all written as a plain-text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
    Txt,
    Pdf,
    Xlsx,
    Docx,
    Zip,
}

impl ExportFormat {
    /// Lowercase wire name, also used as the file extension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Html => "html",
            Self::Txt => "txt",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
            Self::Docx => "docx",
            Self::Zip => "zip",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }

    /// MIME type sent in the `Content-Type` header.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Html => "text/html",
            Self::Txt => "text/plain",
            Self::Pdf => "application/pdf",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Zip => "application/zip",
        }
    }

    /// Human-readable name for the format catalog.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
            Self::Html => "HTML",
            Self::Txt => "Text",
            Self::Pdf => "PDF",
            Self::Xlsx => "Excel",
            Self::Docx => "Word",
            Self::Zip => "ZIP",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Json => "JavaScript Object Notation",
            Self::Csv => "Comma-separated values",
            Self::Html => "HyperText Markup Language page",
            Self::Txt => "Plain text file",
            Self::Pdf => "Portable document (text report)",
            Self::Xlsx => "Spreadsheet (text report)",
            Self::Docx => "Word document (text report)",
            Self::Zip => "Compressed archive",
        }
    }

    /// Whether this format is rendered as the plain-text report.
    #[must_use]
    pub const fn is_text_report(self) -> bool {
        matches!(self, Self::Txt | Self::Pdf | Self::Xlsx | Self::Docx)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            "xlsx" => Ok(Self::Xlsx),
            "docx" => Ok(Self::Docx),
            "zip" => Ok(Self::Zip),
            _ => Err(ParseError::Format(s.to_string())),
        }
    }
}

// ============================================================================
// Export Kind
// ============================================================================

/// One export generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Documents,
    Vocabulary,
    Reviews,
    Notes,
    Highlights,
    ReadingHistory,
    Statistics,
    StudyPlan,
    Anki,
    Batch,
    AllData,
}

impl ExportKind {
    /// Kinds that may be bundled into a batch archive.
    pub const BATCHABLE: [ExportKind; 7] = [
        Self::Documents,
        Self::Vocabulary,
        Self::Reviews,
        Self::Statistics,
        Self::Notes,
        Self::Highlights,
        Self::ReadingHistory,
    ];

    /// Kinds listed by the format catalog and accepted by templates.
    pub const CATALOGUED: [ExportKind; 9] = [
        Self::Documents,
        Self::Vocabulary,
        Self::Reviews,
        Self::Statistics,
        Self::Notes,
        Self::Highlights,
        Self::ReadingHistory,
        Self::Batch,
        Self::AllData,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Vocabulary => "vocabulary",
            Self::Reviews => "reviews",
            Self::Notes => "notes",
            Self::Highlights => "highlights",
            Self::ReadingHistory => "reading_history",
            Self::Statistics => "statistics",
            Self::StudyPlan => "study_plan",
            Self::Anki => "anki",
            Self::Batch => "batch",
            Self::AllData => "all_data",
        }
    }

    /// Entity type written to the audit log.
    #[must_use]
    pub const fn entity_type(self) -> &'static str {
        match self {
            Self::Documents => "DOCUMENTS",
            Self::Vocabulary => "VOCABULARY",
            Self::Reviews => "REVIEWS",
            Self::Notes => "NOTES",
            Self::Highlights => "HIGHLIGHTS",
            Self::ReadingHistory => "READING_HISTORY",
            Self::Statistics => "STATISTICS",
            Self::StudyPlan => "STUDY_PLAN",
            Self::Anki => "ANKI",
            Self::Batch => "BATCH",
            Self::AllData => "ALL_DATA",
        }
    }

    /// Allowed formats, recommended format first.
    #[must_use]
    pub const fn formats(self) -> &'static [ExportFormat] {
        use ExportFormat::*;
        match self {
            Self::Documents => &[Pdf, Docx, Xlsx, Csv, Json, Html, Txt],
            Self::Vocabulary => &[Xlsx, Csv, Json, Pdf],
            Self::Reviews => &[Csv, Json, Pdf, Xlsx],
            Self::Notes => &[Pdf, Html, Txt, Docx, Json],
            Self::Highlights => &[Json, Csv, Pdf, Txt],
            Self::ReadingHistory => &[Csv, Json, Txt],
            Self::Statistics => &[Pdf, Xlsx, Csv, Json],
            Self::StudyPlan => &[Txt],
            Self::Anki => &[Csv],
            Self::Batch => &[Zip],
            Self::AllData => &[Json],
        }
    }

    #[must_use]
    pub fn supports(self, format: ExportFormat) -> bool {
        self.formats().contains(&format)
    }

    #[must_use]
    pub const fn recommended_format(self) -> ExportFormat {
        self.formats()[0]
    }

    /// Upper bound on ids per request, for kinds that take an id list.
    #[must_use]
    pub const fn max_ids(self) -> Option<usize> {
        match self {
            Self::Documents => Some(100),
            Self::Vocabulary | Self::Anki => Some(500),
            Self::Reviews | Self::Notes => Some(200),
            _ => None,
        }
    }

    /// Filename prefix before the timestamp.
    #[must_use]
    pub const fn file_prefix(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Vocabulary => "vocabulary",
            Self::Reviews => "reviews",
            Self::Notes => "notes",
            Self::Highlights => "highlights",
            Self::ReadingHistory => "reading_history",
            Self::Statistics => "learning_statistics",
            Self::StudyPlan => "study_plan",
            Self::Anki => "anki_export",
            Self::Batch => "batch_export",
            Self::AllData => "all_data",
        }
    }

    /// Error code used when requested ids of this kind are not owned.
    #[must_use]
    pub const fn not_found_code(self) -> &'static str {
        match self {
            Self::Documents | Self::Highlights => "DOCUMENT_NOT_FOUND",
            Self::Vocabulary | Self::Anki => "VOCABULARY_NOT_FOUND",
            Self::Reviews => "REVIEW_NOT_FOUND",
            Self::Notes => "NOTE_NOT_FOUND",
            Self::ReadingHistory => "READING_HISTORY_NOT_FOUND",
            _ => "NOT_FOUND",
        }
    }

    /// Short use-case description for a format of this kind.
    #[must_use]
    pub fn use_case(self, format: ExportFormat) -> &'static str {
        use ExportFormat::*;
        match (self, format) {
            (Self::Batch, Zip) => "Several exports in one archive",
            (Self::AllData, Json) => "Complete account backup with full structure",
            (Self::Vocabulary, Csv) => "Import into flashcard tools",
            (Self::Vocabulary, Xlsx) => "Full word list with statistics",
            (Self::Highlights, Json) => "Keeps highlight positions and structure",
            (Self::Statistics, Pdf) => "Printable learning report",
            (_, Pdf) => "Printing and reading",
            (_, Docx) => "Editing in a word processor",
            (_, Xlsx) => "Spreadsheet analysis",
            (_, Csv) => "Importing into other systems",
            (_, Json) => "Programmatic processing and data exchange",
            (_, Html) => "Viewing in a browser",
            (_, Txt) => "Quick plain-text viewing",
            (_, Zip) => "Archive download",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "documents" => Ok(Self::Documents),
            "vocabulary" => Ok(Self::Vocabulary),
            "reviews" => Ok(Self::Reviews),
            "notes" => Ok(Self::Notes),
            "highlights" => Ok(Self::Highlights),
            "reading_history" => Ok(Self::ReadingHistory),
            "statistics" => Ok(Self::Statistics),
            "study_plan" => Ok(Self::StudyPlan),
            "anki" => Ok(Self::Anki),
            "batch" => Ok(Self::Batch),
            "all_data" => Ok(Self::AllData),
            _ => Err(ParseError::Kind(s.to_string())),
        }
    }
}

// ============================================================================
// Tag Kind
// ============================================================================

/// Which entity family a tag applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Document,
    Vocabulary,
}

impl TagKind {
    pub const ALL: [TagKind; 2] = [Self::Document, Self::Vocabulary];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Vocabulary => "vocabulary",
        }
    }

    /// Error code for a missing target entity of this kind.
    #[must_use]
    pub const fn entity_not_found_code(self) -> &'static str {
        match self {
            Self::Document => "DOCUMENT_NOT_FOUND",
            Self::Vocabulary => "VOCABULARY_NOT_FOUND",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" | "documents" => Ok(Self::Document),
            "vocabulary" => Ok(Self::Vocabulary),
            _ => Err(ParseError::TagKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for TagKind {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
