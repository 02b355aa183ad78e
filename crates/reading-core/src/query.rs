//! Pagination and sorting for the export history listing.

use serde::Serialize;

/// Sort key for the export history. Unknown keys fall back to creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistorySort {
    #[default]
    CreatedAt,
    Type,
    Format,
    Status,
    ItemCount,
}

impl HistorySort {
    /// Parse the public sort key; anything unrecognised yields `CreatedAt`.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "type" => Self::Type,
            "format" => Self::Format,
            "status" => Self::Status,
            "itemCount" | "item_count" => Self::ItemCount,
            _ => Self::CreatedAt,
        }
    }

    /// Column in `export_history` this key sorts on.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Type => "entity_type",
            Self::Format => "format",
            Self::Status => "status",
            Self::ItemCount => "item_count",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A validated page request against the export history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort: HistorySort,
    pub order: SortOrder,
}

impl HistoryQuery {
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            sort: HistorySort::default(),
            order: SortOrder::default(),
        }
    }
}

/// Pagination block returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    #[must_use]
    pub fn new(page: u32, page_size: u32, total: i64) -> Self {
        let size = i64::from(page_size.max(1));
        let total_pages = (total + size - 1) / size;
        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_previous: page > 1,
        }
    }
}
