//! Input and aggregate types for the storage layer.
//!
//! Row records live in `reading-core`; this module holds what callers pass
//! in (`New*`, changes, queries) and what aggregate queries return.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use reading_core::{ExportKind, ExportRecord, Tag, TagKind, UserId};
use serde::Serialize;

// ============================================================================
// Ownership
// ============================================================================

/// User-owned tables that export requests name by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnedEntity {
    Document,
    Note,
    Vocabulary,
    ReviewSession,
}

impl OwnedEntity {
    /// Table and key column holding rows of this entity.
    pub const fn table(self) -> (&'static str, &'static str) {
        match self {
            Self::Document => ("documents", "document_id"),
            Self::Note => ("document_notes", "note_id"),
            Self::Vocabulary => ("user_vocabulary", "vocabulary_id"),
            Self::ReviewSession => ("review_sessions", "review_session_id"),
        }
    }
}

impl From<TagKind> for OwnedEntity {
    fn from(kind: TagKind) -> Self {
        match kind {
            TagKind::Document => Self::Document,
            TagKind::Vocabulary => Self::Vocabulary,
        }
    }
}

/// Ids from `requested` absent from `found`, in request order and without
/// repeats.
pub fn missing_ids(requested: &[i64], found: &[i64]) -> Vec<i64> {
    let mut missing: Vec<i64> = Vec::new();
    for id in requested {
        if !found.contains(id) && !missing.contains(id) {
            missing.push(*id);
        }
    }
    missing
}

// ============================================================================
// Export History
// ============================================================================

/// Input for appending one audit record.
#[derive(Debug, Clone)]
pub struct NewExportRecord {
    pub export_id: String,
    pub user_id: UserId,
    pub kind: ExportKind,
    pub entity_ids: Option<Vec<i64>>,
    pub format: String,
    pub item_count: i32,
    pub file_size: i64,
    pub filename: String,
    pub details: serde_json::Value,
}

/// Result of deleting audit records older than a cutoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupSummary {
    pub deleted_count: i64,
    pub freed_space: i64,
    pub deleted_by_type: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct KeyCount {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Aggregates over one user's export history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStats {
    pub total_exports: i64,
    pub recent_exports: i64,
    pub total_file_size: i64,
    pub average_file_size: f64,
    pub by_type: Vec<KeyCount>,
    pub by_format: Vec<KeyCount>,
    pub weekly_trend: Vec<DailyCount>,
    pub top_types: Vec<KeyCount>,
    pub recent_exports_list: Vec<ExportRecord>,
}

/// Window for "recent" export counts.
pub const RECENT_EXPORT_DAYS: i64 = 30;

/// Days covered by the export trend.
pub const TREND_DAYS: i64 = 7;

/// Entries in `top_types`.
pub const TOP_TYPE_COUNT: usize = 5;

/// Entries in `recent_exports_list`.
pub const RECENT_EXPORT_LIST: i64 = 10;

/// Expand sparse per-day counts into one point per day for the last
/// [`TREND_DAYS`] days ending at `today`, oldest first.
pub fn fill_trend(today: NaiveDate, sparse: &[DailyCount]) -> Vec<DailyCount> {
    (0..TREND_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let count = sparse
                .iter()
                .find(|point| point.date == date)
                .map(|point| point.count)
                .unwrap_or(0);
            DailyCount { date, count }
        })
        .collect()
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub user_id: UserId,
    pub name: String,
    pub export_type: ExportKind,
    pub format: String,
    pub description: Option<String>,
    pub config: serde_json::Value,
    pub is_default: bool,
    pub is_public: bool,
}

// ============================================================================
// Tags
// ============================================================================

/// Color given to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#1890ff";

#[derive(Debug, Clone)]
pub struct NewTag {
    pub kind: TagKind,
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a tag; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TagChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl TagChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagSort {
    #[default]
    Name,
    CreatedAt,
    Usage,
}

impl TagSort {
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "created_at" | "createdAt" => Self::CreatedAt,
            "usage" | "usage_count" | "usageCount" => Self::Usage,
            _ => Self::Name,
        }
    }

    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreatedAt => "created_at",
            Self::Usage => "usage_count",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagListQuery {
    pub kind: TagKind,
    pub search: Option<String>,
    pub sort: TagSort,
    pub ascending: bool,
    pub page: u32,
    pub limit: u32,
}

impl TagListQuery {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// How a batch of tags is applied to a batch of documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOperation {
    Add,
    Remove,
    #[default]
    Replace,
}

impl BatchOperation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTagOutcome {
    pub processed_documents: i64,
    pub relations_added: i64,
    pub relations_removed: i64,
}

/// Bulk operation over vocabulary tags themselves.
#[derive(Debug, Clone)]
pub enum VocabularyTagBatch {
    /// Delete every listed tag that is not in use.
    Delete,
    /// Apply the same changes to every listed tag.
    Update(TagChanges),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub processed_count: i64,
    pub failed_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub source_tag_id: i64,
    pub target_tag_id: i64,
    pub merged_count: i64,
    pub dropped_duplicates: i64,
}

/// Most used tag of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MostUsedTag {
    pub tag_id: i64,
    pub name: String,
    pub usage_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub document: i64,
    pub vocabulary: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MostUsed {
    pub document: Option<MostUsedTag>,
    pub vocabulary: Option<MostUsedTag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagStatistics {
    pub total_tags: i64,
    pub document_tags: i64,
    pub vocabulary_tags: i64,
    pub most_used: MostUsed,
    pub tag_distribution: KindCounts,
}

/// Relevance of a tag for a free-text query, or `None` when it does not
/// match at all: exact name 1.0, name contains 0.8, description contains 0.3.
pub fn tag_relevance(tag: &Tag, query: &str) -> Option<f64> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let name = tag.name.to_lowercase();
    if name == needle {
        return Some(1.0);
    }
    if name.contains(&needle) {
        return Some(0.8);
    }
    match &tag.description {
        Some(description) if description.to_lowercase().contains(&needle) => Some(0.3),
        _ => None,
    }
}

/// Lookback window for popular tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl TimeRange {
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Self::Day,
            "week" => Self::Week,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }

    /// Start of the window ending at `now`.
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => now - Duration::days(1),
            Self::Week => now - Duration::weeks(1),
            Self::Month => now - Duration::days(30),
            Self::Year => now - Duration::days(365),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, description: Option<&str>) -> Tag {
        Tag {
            tag_id: 1,
            kind: TagKind::Document,
            name: name.to_string(),
            color: None,
            description: description.map(str::to_string),
            usage_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn relevance_prefers_exact_then_name_then_description() {
        assert_eq!(tag_relevance(&tag("Grammar", None), "grammar"), Some(1.0));
        assert_eq!(tag_relevance(&tag("English grammar", None), "grammar"), Some(0.8));
        assert_eq!(
            tag_relevance(&tag("Syntax", Some("grammar rules")), "Grammar"),
            Some(0.3)
        );
        assert_eq!(tag_relevance(&tag("Syntax", None), "grammar"), None);
        assert_eq!(tag_relevance(&tag("Syntax", None), "   "), None);
    }

    #[test]
    fn trend_has_one_point_per_day_oldest_first() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let sparse = vec![DailyCount {
            date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            count: 4,
        }];
        let trend = fill_trend(today, &sparse);

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(trend[6].date, today);
        assert_eq!(trend[4].count, 4);
        assert_eq!(trend.iter().map(|p| p.count).sum::<i64>(), 4);
    }

    #[test]
    fn missing_ids_keep_request_order_without_repeats() {
        assert_eq!(missing_ids(&[9, 3, 9, 4, 3], &[4]), vec![9, 3]);
        assert!(missing_ids(&[1, 2], &[2, 1]).is_empty());
    }

    #[test]
    fn batch_operation_parsing() {
        assert_eq!(BatchOperation::parse("ADD"), Some(BatchOperation::Add));
        assert_eq!(BatchOperation::parse("merge"), None);
        assert_eq!(BatchOperation::default(), BatchOperation::Replace);
    }

    #[test]
    fn time_range_defaults_to_month() {
        let now = Utc::now();
        assert_eq!(TimeRange::parse_or_default("fortnight"), TimeRange::Month);
        assert_eq!(TimeRange::Week.since(now), now - Duration::days(7));
    }
}
