//! In-memory backend for tests.
//!
//! `MemoryStore` implements every repository trait over plain vectors with
//! the same observable behaviour as [`Store`](crate::Store). Each trait call
//! bumps a counter so tests can assert that a request was rejected before any
//! storage access. Seeding and inspection helpers do not count.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reading_core::{
    AnkiCard, Achievement, DailyStat, Document, DueWord, ExportRecord, ExportTemplate, Highlight,
    HistoryQuery, HistorySort, MasteryBucket, Note, ReadingRecord, ReadingSummary, ReviewItem,
    ReviewSession, ReviewSummary, SortOrder, Tag, TagId, TagKind, TaggedEntity, TrendPoint,
    UserId, UserInfo, UserSetting, VocabularyEntry, WordExample,
};

use crate::error::{StoreError, StoreResult};
use crate::models::{
    fill_trend, missing_ids, BatchCounts, BatchOperation, BatchTagOutcome, CleanupSummary,
    DailyCount, ExportStats, KeyCount, KindCounts, MergeOutcome, MostUsed, MostUsedTag, NewExportRecord,
    NewTag, NewTemplate, OwnedEntity, TagChanges, TagListQuery, TagSort, TagStatistics,
    VocabularyTagBatch, DEFAULT_TAG_COLOR, RECENT_EXPORT_DAYS, RECENT_EXPORT_LIST,
    TOP_TYPE_COUNT, TREND_DAYS,
};
use crate::repository::{
    ExportRepository, HistoryRepository, SessionRepository, TagRepository, TemplateRepository,
};
use crate::templates::mint_template_id;

/// One tag relation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub tag_id: i64,
    pub kind: TagKind,
    pub entity_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Session {
    token: String,
    user: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Data {
    sessions: Vec<Session>,
    users: Vec<UserInfo>,
    documents: Vec<(UserId, Document)>,
    notes: Vec<(UserId, Note)>,
    highlights: Vec<(UserId, Highlight)>,
    vocabulary: Vec<(UserId, VocabularyEntry)>,
    examples: Vec<WordExample>,
    review_sessions: Vec<(UserId, ReviewSession)>,
    review_items: Vec<ReviewItem>,
    reading_history: Vec<(UserId, ReadingRecord)>,
    daily_stats: Vec<(UserId, DailyStat)>,
    achievements: Vec<(UserId, Achievement)>,
    settings: Vec<(UserId, UserSetting)>,
    exports: Vec<ExportRecord>,
    templates: Vec<ExportTemplate>,
    tags: Vec<Tag>,
    relations: Vec<Relation>,
    next_tag_id: i64,
}

impl Data {
    fn owns(&self, user: UserId, entity: OwnedEntity, id: i64) -> bool {
        match entity {
            OwnedEntity::Document => self
                .documents
                .iter()
                .any(|(u, d)| *u == user && d.document_id == id),
            OwnedEntity::Note => self.notes.iter().any(|(u, n)| *u == user && n.note_id == id),
            OwnedEntity::Vocabulary => self
                .vocabulary
                .iter()
                .any(|(u, v)| *u == user && v.vocabulary_id == id),
            OwnedEntity::ReviewSession => self
                .review_sessions
                .iter()
                .any(|(u, s)| *u == user && s.review_session_id == id),
        }
    }

    fn usage(&self, tag_id: i64) -> i64 {
        self.relations.iter().filter(|r| r.tag_id == tag_id).count() as i64
    }

    fn with_usage(&self, tag: &Tag) -> Tag {
        Tag {
            usage_count: self.usage(tag.tag_id),
            ..tag.clone()
        }
    }

    fn tag(&self, kind: TagKind, id: TagId) -> StoreResult<Tag> {
        self.tags
            .iter()
            .find(|t| t.tag_id == id.get() && t.kind == kind)
            .map(|t| self.with_usage(t))
            .ok_or(StoreError::TagNotFound(id.get()))
    }

    fn name_taken(&self, kind: TagKind, name: &str, except: Option<i64>) -> bool {
        self.tags
            .iter()
            .any(|t| t.kind == kind && t.name == name && Some(t.tag_id) != except)
    }

    fn word_of(&self, vocabulary_id: i64) -> Option<String> {
        self.vocabulary
            .iter()
            .find(|(_, v)| v.vocabulary_id == vocabulary_id)
            .map(|(_, v)| v.word.clone())
    }

    fn document_title(&self, document_id: i64) -> Option<String> {
        self.documents
            .iter()
            .find(|(_, d)| d.document_id == document_id)
            .map(|(_, d)| d.title.clone())
    }

    fn update_tag(&mut self, kind: TagKind, id: TagId, changes: &TagChanges) -> StoreResult<Tag> {
        self.tag(kind, id)?;
        if let Some(name) = &changes.name {
            if self.name_taken(kind, name, Some(id.get())) {
                return Err(StoreError::DuplicateTagName { kind, name: name.clone() });
            }
        }
        if let Some(tag) = self.tags.iter_mut().find(|t| t.tag_id == id.get()) {
            if !changes.is_empty() {
                if let Some(name) = &changes.name {
                    tag.name = name.clone();
                }
                if let Some(color) = &changes.color {
                    tag.color = Some(color.clone());
                }
                if let Some(description) = &changes.description {
                    tag.description = Some(description.clone());
                }
                tag.updated_at = Utc::now();
            }
        }
        self.tag(kind, id)
    }

    fn delete_tag(&mut self, kind: TagKind, id: TagId, force: bool) -> StoreResult<i64> {
        self.tag(kind, id)?;
        let usage_count = self.usage(id.get());
        if usage_count > 0 && !force {
            return Err(StoreError::TagInUse {
                tag_id: id.get(),
                usage_count,
            });
        }
        self.relations.retain(|r| r.tag_id != id.get());
        self.tags.retain(|t| t.tag_id != id.get());
        Ok(usage_count)
    }
}

/// Seedable in-memory implementation of [`Backend`](crate::Backend).
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls served so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn data(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn query(&self) -> MutexGuard<'_, Data> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.data()
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Register a session valid for one day.
    pub fn add_session(&self, token: &str, user: UserId) {
        self.add_session_expiring(token, user, Utc::now() + Duration::days(1));
    }

    pub fn add_session_expiring(&self, token: &str, user: UserId, expires_at: DateTime<Utc>) {
        self.data().sessions.push(Session {
            token: token.to_string(),
            user,
            expires_at,
        });
    }

    pub fn add_user(&self, user: UserInfo) {
        self.data().users.push(user);
    }

    pub fn add_document(&self, user: UserId, document: Document) {
        self.data().documents.push((user, document));
    }

    pub fn add_note(&self, user: UserId, note: Note) {
        self.data().notes.push((user, note));
    }

    pub fn add_highlight(&self, user: UserId, highlight: Highlight) {
        self.data().highlights.push((user, highlight));
    }

    pub fn add_vocabulary(&self, user: UserId, entry: VocabularyEntry) {
        self.data().vocabulary.push((user, entry));
    }

    pub fn add_example(&self, example: WordExample) {
        self.data().examples.push(example);
    }

    pub fn add_review_session(&self, user: UserId, session: ReviewSession) {
        self.data().review_sessions.push((user, session));
    }

    pub fn add_review_item(&self, item: ReviewItem) {
        self.data().review_items.push(item);
    }

    pub fn add_reading_record(&self, user: UserId, record: ReadingRecord) {
        self.data().reading_history.push((user, record));
    }

    pub fn add_daily_stat(&self, user: UserId, stat: DailyStat) {
        self.data().daily_stats.push((user, stat));
    }

    pub fn add_achievement(&self, user: UserId, achievement: Achievement) {
        self.data().achievements.push((user, achievement));
    }

    pub fn add_setting(&self, user: UserId, setting: UserSetting) {
        self.data().settings.push((user, setting));
    }

    /// Insert an audit record as-is, e.g. with a backdated `created_at`.
    pub fn add_export_record(&self, record: ExportRecord) {
        self.data().exports.push(record);
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn export_records(&self, user: UserId) -> Vec<ExportRecord> {
        self.data()
            .exports
            .iter()
            .filter(|r| r.user_id == user.get())
            .cloned()
            .collect()
    }

    pub fn relations(&self) -> Vec<Relation> {
        self.data().relations.clone()
    }

    pub fn tag_count(&self) -> usize {
        self.data().tags.len()
    }
}

fn in_ids(ids: Option<&[i64]>, id: i64) -> bool {
    ids.is_none_or(|ids| ids.contains(&id))
}

fn utc_date(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

// ============================================================================
// Sessions
// ============================================================================

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn user_for_token(&self, token: &str) -> StoreResult<Option<UserId>> {
        let now = Utc::now();
        Ok(self
            .query()
            .sessions
            .iter()
            .find(|s| s.token == token && s.expires_at > now)
            .map(|s| s.user))
    }
}

// ============================================================================
// Export Sources
// ============================================================================

#[async_trait]
impl ExportRepository for MemoryStore {
    async fn owned_ids(
        &self,
        user: UserId,
        entity: OwnedEntity,
        ids: &[i64],
    ) -> StoreResult<Vec<i64>> {
        let data = self.query();
        let mut owned: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|id| data.owns(user, entity, *id))
            .collect();
        owned.sort_unstable();
        owned.dedup();
        Ok(owned)
    }

    async fn documents(&self, user: UserId, ids: Option<&[i64]>) -> StoreResult<Vec<Document>> {
        let mut rows: Vec<Document> = self
            .query()
            .documents
            .iter()
            .filter(|(u, d)| *u == user && in_ids(ids, d.document_id))
            .map(|(_, d)| d.clone())
            .collect();
        rows.sort_by_key(|d| d.document_id);
        Ok(rows)
    }

    async fn notes(&self, user: UserId, ids: Option<&[i64]>) -> StoreResult<Vec<Note>> {
        let data = self.query();
        let mut rows: Vec<Note> = data
            .notes
            .iter()
            .filter(|(u, n)| *u == user && in_ids(ids, n.note_id))
            .map(|(_, n)| Note {
                document_title: data.document_title(n.document_id),
                ..n.clone()
            })
            .collect();
        rows.sort_by_key(|n| (n.document_id, n.page_number.unwrap_or(i32::MAX), n.note_id));
        Ok(rows)
    }

    async fn notes_for_documents(
        &self,
        user: UserId,
        document_ids: &[i64],
    ) -> StoreResult<Vec<Note>> {
        let data = self.query();
        let mut rows: Vec<Note> = data
            .notes
            .iter()
            .filter(|(u, n)| *u == user && document_ids.contains(&n.document_id))
            .map(|(_, n)| Note {
                document_title: data.document_title(n.document_id),
                ..n.clone()
            })
            .collect();
        rows.sort_by_key(|n| (n.document_id, n.page_number.unwrap_or(i32::MAX), n.note_id));
        Ok(rows)
    }

    async fn highlights(
        &self,
        user: UserId,
        document_ids: Option<&[i64]>,
    ) -> StoreResult<Vec<Highlight>> {
        let mut rows: Vec<Highlight> = self
            .query()
            .highlights
            .iter()
            .filter(|(u, h)| *u == user && in_ids(document_ids, h.document_id))
            .map(|(_, h)| h.clone())
            .collect();
        rows.sort_by_key(|h| {
            (
                h.document_id,
                h.page_number.unwrap_or(i32::MAX),
                h.start_position.unwrap_or(i32::MAX),
                h.highlight_id,
            )
        });
        Ok(rows)
    }

    async fn vocabulary(
        &self,
        user: UserId,
        ids: Option<&[i64]>,
    ) -> StoreResult<Vec<VocabularyEntry>> {
        let mut rows: Vec<VocabularyEntry> = self
            .query()
            .vocabulary
            .iter()
            .filter(|(u, v)| *u == user && in_ids(ids, v.vocabulary_id))
            .map(|(_, v)| v.clone())
            .collect();
        rows.sort_by_key(|v| v.vocabulary_id);
        Ok(rows)
    }

    async fn word_examples(
        &self,
        user: UserId,
        vocabulary_ids: &[i64],
        per_word: i64,
    ) -> StoreResult<Vec<WordExample>> {
        let data = self.query();
        let mut owned: Vec<i64> = vocabulary_ids
            .iter()
            .copied()
            .filter(|id| data.owns(user, OwnedEntity::Vocabulary, *id))
            .collect();
        owned.sort_unstable();
        owned.dedup();

        let per_word = usize::try_from(per_word).unwrap_or(0);
        Ok(owned
            .into_iter()
            .flat_map(|id| {
                data.examples
                    .iter()
                    .filter(move |e| e.vocabulary_id == id)
                    .take(per_word)
                    .cloned()
            })
            .collect())
    }

    async fn review_sessions(
        &self,
        user: UserId,
        ids: Option<&[i64]>,
    ) -> StoreResult<Vec<ReviewSession>> {
        let mut rows: Vec<ReviewSession> = self
            .query()
            .review_sessions
            .iter()
            .filter(|(u, s)| *u == user && in_ids(ids, s.review_session_id))
            .map(|(_, s)| s.clone())
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.review_session_id.cmp(&a.review_session_id))
        });
        Ok(rows)
    }

    async fn review_sessions_between(
        &self,
        user: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<ReviewSession>> {
        let mut rows: Vec<ReviewSession> = self
            .query()
            .review_sessions
            .iter()
            .filter(|(u, s)| {
                let day = utc_date(s.created_at);
                *u == user && day >= start && day <= end
            })
            .map(|(_, s)| s.clone())
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.review_session_id.cmp(&a.review_session_id))
        });
        Ok(rows)
    }

    async fn review_items(
        &self,
        user: UserId,
        session_ids: &[i64],
    ) -> StoreResult<Vec<ReviewItem>> {
        let data = self.query();
        let mut rows: Vec<ReviewItem> = data
            .review_items
            .iter()
            .filter(|i| {
                session_ids.contains(&i.review_session_id)
                    && data.owns(user, OwnedEntity::ReviewSession, i.review_session_id)
            })
            .map(|i| ReviewItem {
                word: data.word_of(i.vocabulary_id).unwrap_or_else(|| i.word.clone()),
                ..i.clone()
            })
            .collect();
        rows.sort_by_key(|i| (i.review_session_id, i.review_item_id));
        Ok(rows)
    }

    async fn reading_history(&self, user: UserId) -> StoreResult<Vec<ReadingRecord>> {
        let data = self.query();
        let mut rows: Vec<ReadingRecord> = data
            .reading_history
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, r)| ReadingRecord {
                document_title: data.document_title(r.document_id),
                ..r.clone()
            })
            .collect();
        rows.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then(b.history_id.cmp(&a.history_id))
        });
        Ok(rows)
    }

    async fn daily_stats(
        &self,
        user: UserId,
        range: Option<(NaiveDate, NaiveDate)>,
        limit: Option<i64>,
    ) -> StoreResult<Vec<DailyStat>> {
        let mut rows: Vec<DailyStat> = self
            .query()
            .daily_stats
            .iter()
            .filter(|(u, s)| {
                *u == user && range.is_none_or(|(start, end)| s.date >= start && s.date <= end)
            })
            .map(|(_, s)| s.clone())
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(rows)
    }

    async fn mastery_distribution(&self, user: UserId) -> StoreResult<Vec<MasteryBucket>> {
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
        for (_, entry) in self.query().vocabulary.iter().filter(|(u, _)| *u == user) {
            *counts.entry(entry.mastery_level).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(mastery_level, count)| MasteryBucket { mastery_level, count })
            .collect())
    }

    async fn achievements(&self, user: UserId) -> StoreResult<Vec<Achievement>> {
        let mut rows: Vec<Achievement> = self
            .query()
            .achievements
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, a)| a.clone())
            .collect();
        rows.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
        Ok(rows)
    }

    async fn review_summary(&self, user: UserId) -> StoreResult<ReviewSummary> {
        let data = self.query();
        let sessions: Vec<&ReviewSession> = data
            .review_sessions
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, s)| s)
            .collect();
        let accuracies: Vec<f64> = sessions.iter().filter_map(|s| s.accuracy).collect();
        Ok(ReviewSummary {
            total_sessions: sessions.len() as i64,
            total_items: sessions.iter().map(|s| i64::from(s.total_items)).sum(),
            total_correct: sessions.iter().map(|s| i64::from(s.correct_count)).sum(),
            avg_accuracy: (!accuracies.is_empty())
                .then(|| accuracies.iter().sum::<f64>() / accuracies.len() as f64),
        })
    }

    async fn reading_summary(&self, user: UserId) -> StoreResult<ReadingSummary> {
        let data = self.query();
        let documents: Vec<&Document> = data
            .documents
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, d)| d)
            .collect();
        let progress: Vec<f64> = documents.iter().filter_map(|d| d.reading_progress).collect();
        Ok(ReadingSummary {
            total_documents: documents.len() as i64,
            total_pages: documents
                .iter()
                .filter_map(|d| d.page_count)
                .map(i64::from)
                .sum(),
            avg_progress: (!progress.is_empty())
                .then(|| progress.iter().sum::<f64>() / progress.len() as f64),
        })
    }

    async fn learning_trend(&self, user: UserId, since: NaiveDate) -> StoreResult<Vec<TrendPoint>> {
        let mut rows: Vec<TrendPoint> = self
            .query()
            .daily_stats
            .iter()
            .filter(|(u, s)| *u == user && s.date >= since)
            .map(|(_, s)| TrendPoint {
                date: s.date,
                words_studied: s.words_studied,
            })
            .collect();
        rows.sort_by_key(|p| p.date);
        Ok(rows)
    }

    async fn due_words(
        &self,
        user: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DueWord>> {
        let mut rows: Vec<DueWord> = self
            .query()
            .vocabulary
            .iter()
            .filter(|(u, _)| *u == user)
            .filter_map(|(_, v)| {
                let due = v.next_review_date?;
                (due >= start && due <= end).then(|| DueWord {
                    vocabulary_id: v.vocabulary_id,
                    word: v.word.clone(),
                    phonetic: v.phonetic.clone(),
                    meaning: v.meaning.clone(),
                    mastery_level: v.mastery_level,
                    next_review_date: due,
                })
            })
            .collect();
        rows.sort_by_key(|w| (w.next_review_date, w.mastery_level, w.vocabulary_id));
        Ok(rows)
    }

    async fn anki_cards(&self, user: UserId, ids: &[i64]) -> StoreResult<Vec<AnkiCard>> {
        let data = self.query();
        let mut rows: Vec<AnkiCard> = data
            .vocabulary
            .iter()
            .filter(|(u, v)| *u == user && ids.contains(&v.vocabulary_id))
            .map(|(_, v)| {
                let example = data
                    .examples
                    .iter()
                    .find(|e| e.vocabulary_id == v.vocabulary_id);
                AnkiCard {
                    vocabulary_id: v.vocabulary_id,
                    word: v.word.clone(),
                    phonetic: v.phonetic.clone(),
                    meaning: v.meaning.clone(),
                    part_of_speech: v.part_of_speech.clone(),
                    example_sentence: example.map(|e| e.example_sentence.clone()),
                    translation: example.and_then(|e| e.translation.clone()),
                }
            })
            .collect();
        rows.sort_by_key(|c| c.vocabulary_id);
        Ok(rows)
    }

    async fn user_info(&self, user: UserId) -> StoreResult<Option<UserInfo>> {
        Ok(self
            .query()
            .users
            .iter()
            .find(|u| u.user_id == user.get())
            .cloned())
    }

    async fn settings(&self, user: UserId) -> StoreResult<Vec<UserSetting>> {
        let mut rows: Vec<UserSetting> = self
            .query()
            .settings
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, s)| s.clone())
            .collect();
        rows.sort_by(|a, b| a.setting_key.cmp(&b.setting_key));
        Ok(rows)
    }
}

// ============================================================================
// Export History
// ============================================================================

fn key_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<KeyCount> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut rows: Vec<KeyCount> = counts
        .into_iter()
        .map(|(key, count)| KeyCount {
            key: key.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    rows
}

#[async_trait]
impl HistoryRepository for MemoryStore {
    async fn record_export(&self, record: NewExportRecord) -> StoreResult<ExportRecord> {
        let row = ExportRecord {
            export_id: record.export_id,
            user_id: record.user_id.get(),
            operation_type: "EXPORT".to_string(),
            entity_type: record.kind.entity_type().to_string(),
            entity_ids: record.entity_ids,
            format: record.format,
            status: "COMPLETED".to_string(),
            item_count: record.item_count,
            file_size: record.file_size,
            filename: Some(record.filename),
            details: record.details,
            created_at: Utc::now(),
        };
        self.query().exports.push(row.clone());
        Ok(row)
    }

    async fn list_exports(
        &self,
        user: UserId,
        query: &HistoryQuery,
    ) -> StoreResult<(Vec<ExportRecord>, i64)> {
        let mut rows: Vec<ExportRecord> = self
            .query()
            .exports
            .iter()
            .filter(|r| r.user_id == user.get())
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                HistorySort::CreatedAt => a.created_at.cmp(&b.created_at),
                HistorySort::Type => a.entity_type.cmp(&b.entity_type),
                HistorySort::Format => a.format.cmp(&b.format),
                HistorySort::Status => a.status.cmp(&b.status),
                HistorySort::ItemCount => a.item_count.cmp(&b.item_count),
            }
            .then_with(|| a.export_id.cmp(&b.export_id));
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = rows.len() as i64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let page = rows
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .collect();
        Ok((page, total))
    }

    async fn delete_export(
        &self,
        user: UserId,
        export_id: &str,
    ) -> StoreResult<Option<ExportRecord>> {
        let mut data = self.query();
        let position = data
            .exports
            .iter()
            .position(|r| r.user_id == user.get() && r.export_id == export_id);
        Ok(position.map(|index| data.exports.remove(index)))
    }

    async fn cleanup_exports(
        &self,
        user: UserId,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<CleanupSummary> {
        let mut data = self.query();
        let (expired, kept): (Vec<ExportRecord>, Vec<ExportRecord>) = data
            .exports
            .drain(..)
            .partition(|r| r.user_id == user.get() && r.created_at < cutoff);
        data.exports = kept;

        let mut summary = CleanupSummary::default();
        for record in expired {
            summary.deleted_count += 1;
            summary.freed_space += record.file_size;
            *summary.deleted_by_type.entry(record.entity_type).or_insert(0) += 1;
        }
        Ok(summary)
    }

    async fn export_stats(&self, user: UserId, now: DateTime<Utc>) -> StoreResult<ExportStats> {
        let data = self.query();
        let mut rows: Vec<&ExportRecord> = data
            .exports
            .iter()
            .filter(|r| r.user_id == user.get())
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.export_id.cmp(&a.export_id))
        });

        let total_exports = rows.len() as i64;
        let recent_since = now - Duration::days(RECENT_EXPORT_DAYS);
        let total_file_size: i64 = rows.iter().map(|r| r.file_size).sum();

        let today = now.date_naive();
        let trend_start = today - Duration::days(TREND_DAYS);
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for record in &rows {
            let day = utc_date(record.created_at);
            if day > trend_start {
                *per_day.entry(day).or_insert(0) += 1;
            }
        }
        let sparse: Vec<DailyCount> = per_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect();

        let by_type = key_counts(rows.iter().map(|r| r.entity_type.as_str()));
        let top_types = by_type.iter().take(TOP_TYPE_COUNT).cloned().collect();

        Ok(ExportStats {
            total_exports,
            recent_exports: rows.iter().filter(|r| r.created_at >= recent_since).count() as i64,
            total_file_size,
            average_file_size: if total_exports == 0 {
                0.0
            } else {
                total_file_size as f64 / total_exports as f64
            },
            by_format: key_counts(rows.iter().map(|r| r.format.as_str())),
            by_type,
            weekly_trend: fill_trend(today, &sparse),
            top_types,
            recent_exports_list: rows
                .iter()
                .take(RECENT_EXPORT_LIST as usize)
                .map(|r| (*r).clone())
                .collect(),
        })
    }
}

// ============================================================================
// Templates
// ============================================================================

#[async_trait]
impl TemplateRepository for MemoryStore {
    async fn create_template(&self, template: NewTemplate) -> StoreResult<ExportTemplate> {
        let mut data = self.query();
        let owner = Some(template.user_id.get());
        if data
            .templates
            .iter()
            .any(|t| t.user_id == owner && t.name == template.name)
        {
            return Err(StoreError::TemplateNameTaken(template.name));
        }

        let export_type = template.export_type.as_str().to_string();
        let now = Utc::now();
        if template.is_default {
            for existing in data
                .templates
                .iter_mut()
                .filter(|t| t.user_id == owner && t.export_type == export_type && t.is_default)
            {
                existing.is_default = false;
                existing.updated_at = now;
            }
        }

        let created = ExportTemplate {
            template_id: mint_template_id(),
            user_id: owner,
            name: template.name,
            export_type,
            format: template.format,
            description: template.description,
            config: template.config,
            is_default: template.is_default,
            is_public: template.is_public,
            is_system: false,
            created_at: now,
            updated_at: now,
        };
        data.templates.push(created.clone());
        Ok(created)
    }

    async fn visible_templates(
        &self,
        user: UserId,
        export_type: Option<&str>,
    ) -> StoreResult<Vec<ExportTemplate>> {
        let mut rows: Vec<ExportTemplate> = self
            .query()
            .templates
            .iter()
            .filter(|t| t.user_id == Some(user.get()) || t.is_public)
            .filter(|t| export_type.is_none_or(|wanted| t.export_type == wanted))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }
}

// ============================================================================
// Tags
// ============================================================================

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create_tag(&self, tag: NewTag) -> StoreResult<Tag> {
        let mut data = self.query();
        if data.name_taken(tag.kind, &tag.name, None) {
            return Err(StoreError::DuplicateTagName {
                kind: tag.kind,
                name: tag.name,
            });
        }
        data.next_tag_id += 1;
        let now = Utc::now();
        let created = Tag {
            tag_id: data.next_tag_id,
            kind: tag.kind,
            name: tag.name,
            color: Some(tag.color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string())),
            description: tag.description,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        };
        data.tags.push(created.clone());
        Ok(created)
    }

    async fn get_tag(&self, kind: TagKind, id: TagId) -> StoreResult<Tag> {
        self.query().tag(kind, id)
    }

    async fn find_tag(&self, id: TagId) -> StoreResult<Option<Tag>> {
        let data = self.query();
        Ok(data
            .tags
            .iter()
            .find(|t| t.tag_id == id.get())
            .map(|t| data.with_usage(t)))
    }

    async fn tagged_entities(
        &self,
        user: UserId,
        tag: &Tag,
        limit: i64,
    ) -> StoreResult<Vec<TaggedEntity>> {
        let data = self.query();
        let mut rows: Vec<TaggedEntity> = data
            .relations
            .iter()
            .filter(|r| r.tag_id == tag.tag_id)
            .filter_map(|r| {
                let label = match tag.kind {
                    TagKind::Document => data
                        .documents
                        .iter()
                        .find(|(u, d)| *u == user && d.document_id == r.entity_id)
                        .map(|(_, d)| d.title.clone()),
                    TagKind::Vocabulary => data
                        .vocabulary
                        .iter()
                        .find(|(u, v)| *u == user && v.vocabulary_id == r.entity_id)
                        .map(|(_, v)| v.word.clone()),
                }?;
                Some(TaggedEntity {
                    entity_id: r.entity_id,
                    label,
                    tagged_at: r.created_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.tagged_at
                .cmp(&a.tagged_at)
                .then(b.entity_id.cmp(&a.entity_id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn list_tags(&self, query: &TagListQuery) -> StoreResult<(Vec<Tag>, i64)> {
        let data = self.query();
        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let mut rows: Vec<Tag> = data
            .tags
            .iter()
            .filter(|t| t.kind == query.kind)
            .filter(|t| {
                needle.as_deref().is_none_or(|n| {
                    t.name.to_lowercase().contains(n)
                        || t.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(n))
                })
            })
            .map(|t| data.with_usage(t))
            .collect();
        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                TagSort::Name => a.name.cmp(&b.name),
                TagSort::CreatedAt => a.created_at.cmp(&b.created_at),
                TagSort::Usage => a.usage_count.cmp(&b.usage_count),
            }
            .then(a.tag_id.cmp(&b.tag_id));
            if query.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let total = rows.len() as i64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let page = rows
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_tag(&self, kind: TagKind, id: TagId, changes: &TagChanges) -> StoreResult<Tag> {
        self.query().update_tag(kind, id, changes)
    }

    async fn delete_tag(&self, kind: TagKind, id: TagId, force: bool) -> StoreResult<i64> {
        self.query().delete_tag(kind, id, force)
    }

    async fn attach_tag(
        &self,
        user: UserId,
        kind: TagKind,
        tag: TagId,
        entity_id: i64,
    ) -> StoreResult<bool> {
        let mut data = self.query();
        data.tag(kind, tag)?;
        if !data.owns(user, kind.into(), entity_id) {
            return Err(StoreError::EntityNotFound { kind, id: entity_id });
        }
        if data
            .relations
            .iter()
            .any(|r| r.tag_id == tag.get() && r.entity_id == entity_id)
        {
            return Ok(false);
        }
        data.relations.push(Relation {
            tag_id: tag.get(),
            kind,
            entity_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn detach_tag(
        &self,
        user: UserId,
        kind: TagKind,
        tag: TagId,
        entity_id: i64,
    ) -> StoreResult<()> {
        let mut data = self.query();
        data.tag(kind, tag)?;
        if !data.owns(user, kind.into(), entity_id) {
            return Err(StoreError::EntityNotFound { kind, id: entity_id });
        }
        let before = data.relations.len();
        data.relations
            .retain(|r| !(r.tag_id == tag.get() && r.entity_id == entity_id && r.kind == kind));
        if data.relations.len() == before {
            return Err(StoreError::RelationNotFound {
                tag_id: tag.get(),
                entity_id,
            });
        }
        Ok(())
    }

    async fn tags_for_entity(
        &self,
        user: UserId,
        kind: TagKind,
        entity_id: i64,
    ) -> StoreResult<Vec<Tag>> {
        let data = self.query();
        if !data.owns(user, kind.into(), entity_id) {
            return Err(StoreError::EntityNotFound { kind, id: entity_id });
        }
        let mut rows: Vec<Tag> = data
            .relations
            .iter()
            .filter(|r| r.entity_id == entity_id && r.kind == kind)
            .filter_map(|r| data.tags.iter().find(|t| t.tag_id == r.tag_id && t.kind == kind))
            .map(|t| data.with_usage(t))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn apply_document_tags(
        &self,
        user: UserId,
        operation: BatchOperation,
        document_ids: &[i64],
        tags: &[TagId],
    ) -> StoreResult<BatchTagOutcome> {
        let mut data = self.query();

        let mut owned: Vec<i64> = document_ids
            .iter()
            .copied()
            .filter(|id| data.owns(user, OwnedEntity::Document, *id))
            .collect();
        owned.sort_unstable();
        owned.dedup();
        let missing = missing_ids(document_ids, &owned);
        if !missing.is_empty() {
            return Err(StoreError::EntitiesNotFound {
                kind: TagKind::Document,
                ids: missing,
            });
        }

        let tag_ids: Vec<i64> = tags.iter().map(|t| t.get()).collect();
        let known: Vec<i64> = data
            .tags
            .iter()
            .filter(|t| t.kind == TagKind::Document && tag_ids.contains(&t.tag_id))
            .map(|t| t.tag_id)
            .collect();
        let missing = missing_ids(&tag_ids, &known);
        if !missing.is_empty() {
            return Err(StoreError::TagsNotFound(missing));
        }

        let mut outcome = BatchTagOutcome {
            processed_documents: owned.len() as i64,
            ..BatchTagOutcome::default()
        };

        let before = data.relations.len();
        match operation {
            BatchOperation::Add => {}
            BatchOperation::Remove => data.relations.retain(|r| {
                !(r.kind == TagKind::Document
                    && owned.contains(&r.entity_id)
                    && tag_ids.contains(&r.tag_id))
            }),
            BatchOperation::Replace => data.relations.retain(|r| {
                !(r.kind == TagKind::Document
                    && owned.contains(&r.entity_id)
                    && !tag_ids.contains(&r.tag_id))
            }),
        }
        outcome.relations_removed = (before - data.relations.len()) as i64;

        if operation != BatchOperation::Remove {
            let now = Utc::now();
            for entity_id in &owned {
                for tag_id in &tag_ids {
                    let exists = data
                        .relations
                        .iter()
                        .any(|r| r.tag_id == *tag_id && r.entity_id == *entity_id);
                    if !exists {
                        data.relations.push(Relation {
                            tag_id: *tag_id,
                            kind: TagKind::Document,
                            entity_id: *entity_id,
                            created_at: now,
                        });
                        outcome.relations_added += 1;
                    }
                }
            }
        }

        Ok(outcome)
    }

    async fn batch_vocabulary_tags(
        &self,
        batch: &VocabularyTagBatch,
        tags: &[TagId],
    ) -> StoreResult<BatchCounts> {
        let mut data = self.query();
        let mut counts = BatchCounts::default();
        for tag in tags {
            let result = match batch {
                VocabularyTagBatch::Delete => {
                    data.delete_tag(TagKind::Vocabulary, *tag, false).map(|_| ())
                }
                VocabularyTagBatch::Update(changes) => data
                    .update_tag(TagKind::Vocabulary, *tag, changes)
                    .map(|_| ()),
            };
            match result {
                Ok(()) => counts.processed_count += 1,
                Err(e) if e.is_client_error() => counts.failed_count += 1,
                Err(e) => return Err(e),
            }
        }
        Ok(counts)
    }

    async fn search_tags(&self, query: &str, kind: Option<TagKind>) -> StoreResult<Vec<Tag>> {
        let data = self.query();
        let needle = query.trim().to_lowercase();
        let mut rows: Vec<Tag> = data
            .tags
            .iter()
            .filter(|t| kind.is_none_or(|k| t.kind == k))
            .filter(|t| {
                t.name.to_lowercase().contains(&needle)
                    || t.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .map(|t| data.with_usage(t))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn merge_tags(&self, source: TagId, target: TagId) -> StoreResult<MergeOutcome> {
        let mut data = self.query();
        let from = data
            .tags
            .iter()
            .find(|t| t.tag_id == source.get())
            .map(|t| t.kind)
            .ok_or(StoreError::TagNotFound(source.get()))?;
        let into = data
            .tags
            .iter()
            .find(|t| t.tag_id == target.get())
            .map(|t| t.kind)
            .ok_or(StoreError::TagNotFound(target.get()))?;
        if from != into {
            return Err(StoreError::TagKindMismatch {
                source_tag: source.get(),
                target_tag: target.get(),
            });
        }

        let target_entities: Vec<i64> = data
            .relations
            .iter()
            .filter(|r| r.tag_id == target.get())
            .map(|r| r.entity_id)
            .collect();
        let before = data.relations.len();
        data.relations
            .retain(|r| !(r.tag_id == source.get() && target_entities.contains(&r.entity_id)));
        let dropped = (before - data.relations.len()) as i64;

        let mut merged = 0;
        for relation in data.relations.iter_mut().filter(|r| r.tag_id == source.get()) {
            relation.tag_id = target.get();
            merged += 1;
        }
        data.tags.retain(|t| t.tag_id != source.get());

        Ok(MergeOutcome {
            source_tag_id: source.get(),
            target_tag_id: target.get(),
            merged_count: merged,
            dropped_duplicates: dropped,
        })
    }

    async fn popular_tags(
        &self,
        kind: Option<TagKind>,
        since: DateTime<Utc>,
        limit: i64,
    ) -> StoreResult<Vec<Tag>> {
        let data = self.query();
        let mut rows: Vec<Tag> = data
            .tags
            .iter()
            .filter(|t| kind.is_none_or(|k| t.kind == k))
            .filter_map(|t| {
                let usage_count = data
                    .relations
                    .iter()
                    .filter(|r| r.tag_id == t.tag_id && r.created_at >= since)
                    .count() as i64;
                (usage_count > 0).then(|| Tag {
                    usage_count,
                    ..t.clone()
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn tag_statistics(&self) -> StoreResult<TagStatistics> {
        let data = self.query();
        let count_tags = |kind: TagKind| data.tags.iter().filter(|t| t.kind == kind).count() as i64;
        let count_relations =
            |kind: TagKind| data.relations.iter().filter(|r| r.kind == kind).count() as i64;
        let most_used = |kind: TagKind| {
            data.tags
                .iter()
                .filter(|t| t.kind == kind)
                .map(|t| MostUsedTag {
                    tag_id: t.tag_id,
                    name: t.name.clone(),
                    usage_count: data.usage(t.tag_id),
                })
                .filter(|t| t.usage_count > 0)
                .min_by(|a, b| {
                    b.usage_count
                        .cmp(&a.usage_count)
                        .then_with(|| a.name.cmp(&b.name))
                })
        };

        let document_tags = count_tags(TagKind::Document);
        let vocabulary_tags = count_tags(TagKind::Vocabulary);
        Ok(TagStatistics {
            total_tags: document_tags + vocabulary_tags,
            document_tags,
            vocabulary_tags,
            most_used: MostUsed {
                document: most_used(TagKind::Document),
                vocabulary: most_used(TagKind::Vocabulary),
            },
            tag_distribution: KindCounts {
                document: count_relations(TagKind::Document),
                vocabulary: count_relations(TagKind::Vocabulary),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: i64, title: &str) -> Document {
        Document {
            document_id: id,
            title: title.to_string(),
            author: None,
            description: None,
            file_path: None,
            file_size: None,
            page_count: Some(10),
            reading_progress: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_tag(name: &str) -> NewTag {
        NewTag {
            kind: TagKind::Document,
            name: name.to_string(),
            color: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn owned_ids_ignore_other_users_rows() {
        let store = MemoryStore::new();
        store.add_document(UserId(1), document(10, "Mine"));
        store.add_document(UserId(2), document(11, "Theirs"));

        let owned = store
            .owned_ids(UserId(1), OwnedEntity::Document, &[10, 11, 12])
            .await
            .unwrap();

        assert_eq!(owned, vec![10]);
        assert_eq!(store.queries(), 1);
    }

    #[tokio::test]
    async fn merge_drops_duplicate_relations() {
        let store = MemoryStore::new();
        let user = UserId(1);
        store.add_document(user, document(1, "A"));
        store.add_document(user, document(2, "B"));
        let source = store.create_tag(new_tag("grammar")).await.unwrap();
        let target = store.create_tag(new_tag("syntax")).await.unwrap();
        let (source_id, target_id) = (TagId(source.tag_id), TagId(target.tag_id));

        store.attach_tag(user, TagKind::Document, source_id, 1).await.unwrap();
        store.attach_tag(user, TagKind::Document, source_id, 2).await.unwrap();
        store.attach_tag(user, TagKind::Document, target_id, 2).await.unwrap();

        let outcome = store.merge_tags(source_id, target_id).await.unwrap();

        assert_eq!(outcome.merged_count, 1);
        assert_eq!(outcome.dropped_duplicates, 1);
        let relations = store.relations();
        assert_eq!(relations.len(), 2);
        assert!(relations.iter().all(|r| r.tag_id == target.tag_id));
        assert!(store.find_tag(source_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn in_use_tag_needs_force() {
        let store = MemoryStore::new();
        let user = UserId(1);
        store.add_document(user, document(1, "A"));
        let tag = store.create_tag(new_tag("history")).await.unwrap();
        store
            .attach_tag(user, TagKind::Document, TagId(tag.tag_id), 1)
            .await
            .unwrap();

        let refused = store
            .delete_tag(TagKind::Document, TagId(tag.tag_id), false)
            .await;
        assert!(matches!(refused, Err(StoreError::TagInUse { usage_count: 1, .. })));

        let removed = store
            .delete_tag(TagKind::Document, TagId(tag.tag_id), true)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.relations().is_empty());
    }

    #[tokio::test]
    async fn cleanup_is_idempotent() {
        let store = MemoryStore::new();
        let user = UserId(3);
        store.add_export_record(ExportRecord {
            export_id: "export_documents_1_abcdef01".to_string(),
            user_id: user.get(),
            operation_type: "EXPORT".to_string(),
            entity_type: "DOCUMENT".to_string(),
            entity_ids: None,
            format: "pdf".to_string(),
            status: "COMPLETED".to_string(),
            item_count: 2,
            file_size: 512,
            filename: None,
            details: serde_json::json!({}),
            created_at: Utc::now() - Duration::days(60),
        });

        let cutoff = Utc::now() - Duration::days(30);
        let first = store.cleanup_exports(user, cutoff).await.unwrap();
        let second = store.cleanup_exports(user, cutoff).await.unwrap();

        assert_eq!(first.deleted_count, 1);
        assert_eq!(first.freed_space, 512);
        assert_eq!(first.deleted_by_type.get("DOCUMENT"), Some(&1));
        assert_eq!(second, CleanupSummary::default());
    }
}
