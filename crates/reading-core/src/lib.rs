//! reading-core: shared types for the reading platform backend
//!
//! This crate provides:
//! - Typed identifiers (`UserId`, `TagId`, `ExportId`)
//! - The export format and export kind tables (allow-lists, id limits,
//!   file prefixes, content types)
//! - Tag kinds
//! - Row-shaped domain records read by `reading-store` and rendered by
//!   `reading-export`
//! - Pagination and sort types for the export history

pub mod format;
pub mod query;
pub mod records;
pub mod types;

pub use format::{ExportFormat, ExportKind, ParseError, TagKind};
pub use query::{HistoryQuery, HistorySort, Pagination, SortOrder};
pub use records::*;
pub use types::{ExportId, TagId, UserId};
