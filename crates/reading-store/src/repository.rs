//! Repository traits at the edge of the storage layer.
//!
//! Handlers depend on these traits rather than on `Store` directly, so the
//! same routes run against PostgreSQL in production and against
//! `MemoryStore` in tests. Every query is scoped by the acting user except
//! tag definitions, which form a shared taxonomy.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reading_core::{
    AnkiCard, Achievement, DailyStat, Document, DueWord, ExportRecord, ExportTemplate,
    Highlight, HistoryQuery, MasteryBucket, Note, ReadingRecord, ReadingSummary, ReviewItem,
    ReviewSession, ReviewSummary, Tag, TagId, TagKind, TaggedEntity, TrendPoint, UserId,
    UserInfo, UserSetting, VocabularyEntry, WordExample,
};

use crate::error::StoreResult;
use crate::models::{
    BatchCounts, BatchOperation, BatchTagOutcome, CleanupSummary, ExportStats, MergeOutcome,
    NewExportRecord, NewTag, NewTemplate, OwnedEntity, TagChanges, TagListQuery, TagStatistics,
    VocabularyTagBatch,
};

// ============================================================================
// Sessions
// ============================================================================

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Resolve a bearer token to its user if the session has not expired.
    async fn user_for_token(&self, token: &str) -> StoreResult<Option<UserId>>;
}

// ============================================================================
// Export Sources
// ============================================================================

/// Read access to everything an export can contain.
///
/// Methods taking `Option<&[i64]>` return all of the user's rows for `None`.
#[async_trait]
pub trait ExportRepository: Send + Sync {
    /// The subset of `ids` that exist and belong to `user`.
    async fn owned_ids(&self, user: UserId, entity: OwnedEntity, ids: &[i64])
    -> StoreResult<Vec<i64>>;

    async fn documents(&self, user: UserId, ids: Option<&[i64]>) -> StoreResult<Vec<Document>>;

    async fn notes(&self, user: UserId, ids: Option<&[i64]>) -> StoreResult<Vec<Note>>;

    async fn notes_for_documents(&self, user: UserId, document_ids: &[i64])
    -> StoreResult<Vec<Note>>;

    /// Highlights ordered by document, page, then start position.
    async fn highlights(&self, user: UserId, document_ids: Option<&[i64]>)
    -> StoreResult<Vec<Highlight>>;

    async fn vocabulary(&self, user: UserId, ids: Option<&[i64]>)
    -> StoreResult<Vec<VocabularyEntry>>;

    /// Up to `per_word` examples for each listed vocabulary entry.
    async fn word_examples(&self, user: UserId, vocabulary_ids: &[i64], per_word: i64)
    -> StoreResult<Vec<WordExample>>;

    async fn review_sessions(&self, user: UserId, ids: Option<&[i64]>)
    -> StoreResult<Vec<ReviewSession>>;

    /// Sessions created on days within `[start, end]`.
    async fn review_sessions_between(&self, user: UserId, start: NaiveDate, end: NaiveDate)
    -> StoreResult<Vec<ReviewSession>>;

    async fn review_items(&self, user: UserId, session_ids: &[i64])
    -> StoreResult<Vec<ReviewItem>>;

    /// Reading sessions, newest first.
    async fn reading_history(&self, user: UserId) -> StoreResult<Vec<ReadingRecord>>;

    /// Daily stats newest first, optionally within a date range and capped.
    async fn daily_stats(
        &self,
        user: UserId,
        range: Option<(NaiveDate, NaiveDate)>,
        limit: Option<i64>,
    ) -> StoreResult<Vec<DailyStat>>;

    async fn mastery_distribution(&self, user: UserId) -> StoreResult<Vec<MasteryBucket>>;

    async fn achievements(&self, user: UserId) -> StoreResult<Vec<Achievement>>;

    async fn review_summary(&self, user: UserId) -> StoreResult<ReviewSummary>;

    async fn reading_summary(&self, user: UserId) -> StoreResult<ReadingSummary>;

    /// Words studied per day from `since` onwards, oldest first.
    async fn learning_trend(&self, user: UserId, since: NaiveDate)
    -> StoreResult<Vec<TrendPoint>>;

    /// Vocabulary entries whose next review falls within `[start, end]`.
    async fn due_words(&self, user: UserId, start: NaiveDate, end: NaiveDate)
    -> StoreResult<Vec<DueWord>>;

    /// Flashcards for the listed entries, with the first example of each.
    async fn anki_cards(&self, user: UserId, ids: &[i64]) -> StoreResult<Vec<AnkiCard>>;

    async fn user_info(&self, user: UserId) -> StoreResult<Option<UserInfo>>;

    async fn settings(&self, user: UserId) -> StoreResult<Vec<UserSetting>>;
}

// ============================================================================
// Export History
// ============================================================================

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn record_export(&self, record: NewExportRecord) -> StoreResult<ExportRecord>;

    /// One page of the user's history plus the total record count.
    async fn list_exports(&self, user: UserId, query: &HistoryQuery)
    -> StoreResult<(Vec<ExportRecord>, i64)>;

    /// Delete one record by its minted id; `None` when the user has no such
    /// record.
    async fn delete_export(&self, user: UserId, export_id: &str)
    -> StoreResult<Option<ExportRecord>>;

    /// Delete the user's records created before `cutoff`.
    async fn cleanup_exports(&self, user: UserId, cutoff: DateTime<Utc>)
    -> StoreResult<CleanupSummary>;

    async fn export_stats(&self, user: UserId, now: DateTime<Utc>) -> StoreResult<ExportStats>;
}

// ============================================================================
// Templates
// ============================================================================

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Persist a template. Fails with `TemplateNameTaken` when the user
    /// already owns one with the same name; a new default clears the
    /// previous default of the same type.
    async fn create_template(&self, template: NewTemplate) -> StoreResult<ExportTemplate>;

    /// The user's own templates plus other users' public ones, default first
    /// then newest first.
    async fn visible_templates(&self, user: UserId, export_type: Option<&str>)
    -> StoreResult<Vec<ExportTemplate>>;
}

// ============================================================================
// Tags
// ============================================================================

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create_tag(&self, tag: NewTag) -> StoreResult<Tag>;

    /// Tag of the given kind; `TagNotFound` otherwise.
    async fn get_tag(&self, kind: TagKind, id: TagId) -> StoreResult<Tag>;

    /// Tag of any kind.
    async fn find_tag(&self, id: TagId) -> StoreResult<Option<Tag>>;

    /// The user's entities carrying `tag`, newest relation first.
    async fn tagged_entities(&self, user: UserId, tag: &Tag, limit: i64)
    -> StoreResult<Vec<TaggedEntity>>;

    async fn list_tags(&self, query: &TagListQuery) -> StoreResult<(Vec<Tag>, i64)>;

    async fn update_tag(&self, kind: TagKind, id: TagId, changes: &TagChanges)
    -> StoreResult<Tag>;

    /// Delete a tag, returning how many relations went with it.
    async fn delete_tag(&self, kind: TagKind, id: TagId, force: bool) -> StoreResult<i64>;

    /// Attach; returns `false` when the relation already existed.
    async fn attach_tag(&self, user: UserId, kind: TagKind, tag: TagId, entity_id: i64)
    -> StoreResult<bool>;

    async fn detach_tag(&self, user: UserId, kind: TagKind, tag: TagId, entity_id: i64)
    -> StoreResult<()>;

    async fn tags_for_entity(&self, user: UserId, kind: TagKind, entity_id: i64)
    -> StoreResult<Vec<Tag>>;

    /// Apply `operation` with `tags` to every listed document in one
    /// transaction.
    async fn apply_document_tags(
        &self,
        user: UserId,
        operation: BatchOperation,
        document_ids: &[i64],
        tags: &[TagId],
    ) -> StoreResult<BatchTagOutcome>;

    async fn batch_vocabulary_tags(&self, batch: &VocabularyTagBatch, tags: &[TagId])
    -> StoreResult<BatchCounts>;

    /// Tags whose name or description contains `query`, case-insensitively.
    async fn search_tags(&self, query: &str, kind: Option<TagKind>) -> StoreResult<Vec<Tag>>;

    /// Move `source`'s relations onto `target` and delete `source`.
    async fn merge_tags(&self, source: TagId, target: TagId) -> StoreResult<MergeOutcome>;

    /// Tags ordered by relations created since `since`; `usage_count`
    /// holds that windowed count.
    async fn popular_tags(&self, kind: Option<TagKind>, since: DateTime<Utc>, limit: i64)
    -> StoreResult<Vec<Tag>>;

    async fn tag_statistics(&self) -> StoreResult<TagStatistics>;
}

/// Everything the HTTP layer needs from storage.
pub trait Backend:
    SessionRepository + ExportRepository + HistoryRepository + TemplateRepository + TagRepository
{
}

impl<T> Backend for T where
    T: SessionRepository
        + ExportRepository
        + HistoryRepository
        + TemplateRepository
        + TagRepository
{
}
