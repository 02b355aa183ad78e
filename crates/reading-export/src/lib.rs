//! reading-export: Export renderers for the reading platform
//!
//! This crate provides:
//! - One renderer per export kind, turning borrowed rows into file bytes
//! - CSV quoting and HTML escaping shared by every renderer
//! - Study-plan scheduling, the Anki deck, zip bundles and the full-account
//!   snapshot
//! - The format catalog and the built-in export templates
//!
//! Nothing here touches storage or the network; handlers fetch rows through
//! `reading-store` and hand slices to these renderers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reading_export::{export_filename_now, VocabularyExport};
//!
//! let export = VocabularyExport { entries: &entries, examples: None, include_statistics: true };
//! let bytes = export.render(ExportFormat::Csv, Utc::now())?;
//! let filename = export_filename_now("vocabulary", "csv");
//! ```

pub mod all_data;
pub mod anki;
pub mod archive;
pub mod catalog;
pub mod documents;
pub mod error;
pub mod escape;
pub mod filename;
pub mod highlights;
pub mod layout;
pub mod notes;
pub mod reading_history;
pub mod reviews;
pub mod statistics;
pub mod study_plan;
pub mod templates;
pub mod vocabulary;

pub use all_data::{AllData, DATA_SECTIONS};
pub use anki::{render_anki, ANKI_AUDIT_FORMAT, DEFAULT_DECK_NAME};
pub use archive::{build_bundle, BatchBundle, BatchSection};
pub use catalog::{format_catalog, formats_for, FormatInfo};
pub use documents::DocumentsExport;
pub use error::{RenderError, RenderResult};
pub use filename::{export_filename, export_filename_now};
pub use highlights::HighlightsExport;
pub use notes::NotesExport;
pub use reading_history::ReadingHistoryExport;
pub use reviews::ReviewsExport;
pub use statistics::{StatisticsExport, DAILY_STATS_LIMIT, TREND_DAYS};
pub use study_plan::{plan_days, PlanDay, StudyPlan, Workload, DEFAULT_DAILY_GOAL, MAX_PLAN_DAYS};
pub use templates::system_templates;
pub use vocabulary::{VocabularyExport, VocabularyStatistics, EXAMPLES_PER_WORD, MASTERED_LEVEL};
