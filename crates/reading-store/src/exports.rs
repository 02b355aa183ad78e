//! Export source queries.
//!
//! Every query filters on `user_id`; optional id lists are bound as a
//! nullable `BIGINT[]` so one statement serves both "these ids" and "all of
//! the user's rows".

use async_trait::async_trait;
use chrono::NaiveDate;
use reading_core::{
    AnkiCard, Achievement, DailyStat, Document, DueWord, Highlight, MasteryBucket, Note,
    ReadingRecord, ReadingSummary, ReviewItem, ReviewSession, ReviewSummary, TrendPoint, UserId,
    UserInfo, UserSetting, VocabularyEntry, WordExample,
};

use crate::error::StoreResult;
use crate::models::OwnedEntity;
use crate::repository::ExportRepository;
use crate::store::Store;

const NOTE_COLUMNS: &str = r#"
    SELECT n.note_id, n.document_id, d.title AS document_title, n.page_number,
           n.content, n.highlight_id, n.created_at, n.updated_at
    FROM document_notes n
    LEFT JOIN documents d ON d.document_id = n.document_id
"#;

const REVIEW_SESSION_COLUMNS: &str = r#"
    SELECT review_session_id, start_time, end_time, total_items, correct_count,
           wrong_count, accuracy, session_type, created_at
    FROM review_sessions
"#;

#[async_trait]
impl ExportRepository for Store {
    async fn owned_ids(
        &self,
        user: UserId,
        entity: OwnedEntity,
        ids: &[i64],
    ) -> StoreResult<Vec<i64>> {
        let (table, key) = entity.table();
        let sql = format!("SELECT {key} FROM {table} WHERE user_id = $1 AND {key} = ANY($2)");
        let rows: Vec<(i64,)> = sqlx::query_as(&sql)
            .bind(user.get())
            .bind(ids)
            .fetch_all(self.pool())
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn documents(&self, user: UserId, ids: Option<&[i64]>) -> StoreResult<Vec<Document>> {
        Ok(sqlx::query_as::<_, Document>(
            r#"
            SELECT document_id, title, author, description, file_path, file_size,
                   page_count, reading_progress, created_at, updated_at
            FROM documents
            WHERE user_id = $1 AND ($2::BIGINT[] IS NULL OR document_id = ANY($2))
            ORDER BY document_id
            "#,
        )
        .bind(user.get())
        .bind(ids)
        .fetch_all(self.pool())
        .await?)
    }

    async fn notes(&self, user: UserId, ids: Option<&[i64]>) -> StoreResult<Vec<Note>> {
        let sql = format!(
            "{NOTE_COLUMNS} WHERE n.user_id = $1 AND ($2::BIGINT[] IS NULL OR n.note_id = ANY($2)) \
             ORDER BY n.document_id, n.page_number NULLS LAST, n.note_id"
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(user.get())
            .bind(ids)
            .fetch_all(self.pool())
            .await?)
    }

    async fn notes_for_documents(
        &self,
        user: UserId,
        document_ids: &[i64],
    ) -> StoreResult<Vec<Note>> {
        let sql = format!(
            "{NOTE_COLUMNS} WHERE n.user_id = $1 AND n.document_id = ANY($2) \
             ORDER BY n.document_id, n.page_number NULLS LAST, n.note_id"
        );
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(user.get())
            .bind(document_ids)
            .fetch_all(self.pool())
            .await?)
    }

    async fn highlights(
        &self,
        user: UserId,
        document_ids: Option<&[i64]>,
    ) -> StoreResult<Vec<Highlight>> {
        Ok(sqlx::query_as::<_, Highlight>(
            r#"
            SELECT highlight_id, document_id, page_number, text_content, color,
                   start_position, end_position, created_at
            FROM document_highlights
            WHERE user_id = $1 AND ($2::BIGINT[] IS NULL OR document_id = ANY($2))
            ORDER BY document_id, page_number NULLS LAST, start_position NULLS LAST, highlight_id
            "#,
        )
        .bind(user.get())
        .bind(document_ids)
        .fetch_all(self.pool())
        .await?)
    }

    async fn vocabulary(
        &self,
        user: UserId,
        ids: Option<&[i64]>,
    ) -> StoreResult<Vec<VocabularyEntry>> {
        Ok(sqlx::query_as::<_, VocabularyEntry>(
            r#"
            SELECT uv.vocabulary_id, w.word, w.phonetic, w.definition AS meaning,
                   w.part_of_speech, uv.difficulty, uv.mastery_level, uv.study_count,
                   uv.correct_count, uv.wrong_count, uv.last_studied_at,
                   uv.next_review_date, uv.created_at
            FROM user_vocabulary uv
            JOIN words w ON w.word_id = uv.word_id
            WHERE uv.user_id = $1 AND ($2::BIGINT[] IS NULL OR uv.vocabulary_id = ANY($2))
            ORDER BY uv.vocabulary_id
            "#,
        )
        .bind(user.get())
        .bind(ids)
        .fetch_all(self.pool())
        .await?)
    }

    async fn word_examples(
        &self,
        user: UserId,
        vocabulary_ids: &[i64],
        per_word: i64,
    ) -> StoreResult<Vec<WordExample>> {
        Ok(sqlx::query_as::<_, WordExample>(
            r#"
            SELECT vocabulary_id, example_sentence, translation
            FROM (
                SELECT uv.vocabulary_id, e.example_sentence, e.translation,
                       ROW_NUMBER() OVER (PARTITION BY uv.vocabulary_id ORDER BY e.example_id) AS rn
                FROM user_vocabulary uv
                JOIN word_examples e ON e.word_id = uv.word_id
                WHERE uv.user_id = $1 AND uv.vocabulary_id = ANY($2)
            ) ranked
            WHERE rn <= $3
            ORDER BY vocabulary_id, rn
            "#,
        )
        .bind(user.get())
        .bind(vocabulary_ids)
        .bind(per_word)
        .fetch_all(self.pool())
        .await?)
    }

    async fn review_sessions(
        &self,
        user: UserId,
        ids: Option<&[i64]>,
    ) -> StoreResult<Vec<ReviewSession>> {
        let sql = format!(
            "{REVIEW_SESSION_COLUMNS} WHERE user_id = $1 \
             AND ($2::BIGINT[] IS NULL OR review_session_id = ANY($2)) \
             ORDER BY created_at DESC, review_session_id DESC"
        );
        Ok(sqlx::query_as::<_, ReviewSession>(&sql)
            .bind(user.get())
            .bind(ids)
            .fetch_all(self.pool())
            .await?)
    }

    async fn review_sessions_between(
        &self,
        user: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<ReviewSession>> {
        let sql = format!(
            "{REVIEW_SESSION_COLUMNS} WHERE user_id = $1 \
             AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3 \
             ORDER BY created_at DESC, review_session_id DESC"
        );
        Ok(sqlx::query_as::<_, ReviewSession>(&sql)
            .bind(user.get())
            .bind(start)
            .bind(end)
            .fetch_all(self.pool())
            .await?)
    }

    async fn review_items(
        &self,
        user: UserId,
        session_ids: &[i64],
    ) -> StoreResult<Vec<ReviewItem>> {
        Ok(sqlx::query_as::<_, ReviewItem>(
            r#"
            SELECT ri.review_item_id, ri.review_session_id, ri.vocabulary_id, w.word,
                   ri.user_answer AS answer, ri.is_correct, ri.response_time_ms, ri.created_at
            FROM review_items ri
            JOIN review_sessions rs ON rs.review_session_id = ri.review_session_id
            JOIN user_vocabulary uv ON uv.vocabulary_id = ri.vocabulary_id
            JOIN words w ON w.word_id = uv.word_id
            WHERE rs.user_id = $1 AND ri.review_session_id = ANY($2)
            ORDER BY ri.review_session_id, ri.review_item_id
            "#,
        )
        .bind(user.get())
        .bind(session_ids)
        .fetch_all(self.pool())
        .await?)
    }

    async fn reading_history(&self, user: UserId) -> StoreResult<Vec<ReadingRecord>> {
        Ok(sqlx::query_as::<_, ReadingRecord>(
            r#"
            SELECT rh.history_id, rh.document_id, d.title AS document_title, rh.start_time,
                   rh.end_time, rh.duration_seconds, rh.pages_read, rh.created_at
            FROM reading_history rh
            LEFT JOIN documents d ON d.document_id = rh.document_id
            WHERE rh.user_id = $1
            ORDER BY rh.start_time DESC, rh.history_id DESC
            "#,
        )
        .bind(user.get())
        .fetch_all(self.pool())
        .await?)
    }

    async fn daily_stats(
        &self,
        user: UserId,
        range: Option<(NaiveDate, NaiveDate)>,
        limit: Option<i64>,
    ) -> StoreResult<Vec<DailyStat>> {
        let (start, end) = match range {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };
        Ok(sqlx::query_as::<_, DailyStat>(
            r#"
            SELECT date, total_study_time, words_studied, documents_read,
                   notes_created, highlights_created
            FROM daily_learning_stats
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR date >= $2)
              AND ($3::DATE IS NULL OR date <= $3)
            ORDER BY date DESC
            LIMIT $4
            "#,
        )
        .bind(user.get())
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(self.pool())
        .await?)
    }

    async fn mastery_distribution(&self, user: UserId) -> StoreResult<Vec<MasteryBucket>> {
        Ok(sqlx::query_as::<_, MasteryBucket>(
            r#"
            SELECT mastery_level, COUNT(*) AS count
            FROM user_vocabulary
            WHERE user_id = $1
            GROUP BY mastery_level
            ORDER BY mastery_level
            "#,
        )
        .bind(user.get())
        .fetch_all(self.pool())
        .await?)
    }

    async fn achievements(&self, user: UserId) -> StoreResult<Vec<Achievement>> {
        Ok(sqlx::query_as::<_, Achievement>(
            r#"
            SELECT a.achievement_id, a.name, a.description, a.icon_url, a.points, ua.unlocked_at
            FROM user_achievements ua
            JOIN learning_achievements a ON a.achievement_id = ua.achievement_id
            WHERE ua.user_id = $1
            ORDER BY ua.unlocked_at DESC
            "#,
        )
        .bind(user.get())
        .fetch_all(self.pool())
        .await?)
    }

    async fn review_summary(&self, user: UserId) -> StoreResult<ReviewSummary> {
        Ok(sqlx::query_as::<_, ReviewSummary>(
            r#"
            SELECT COUNT(*) AS total_sessions,
                   COALESCE(SUM(total_items), 0)::BIGINT AS total_items,
                   COALESCE(SUM(correct_count), 0)::BIGINT AS total_correct,
                   AVG(accuracy)::FLOAT8 AS avg_accuracy
            FROM review_sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user.get())
        .fetch_one(self.pool())
        .await?)
    }

    async fn reading_summary(&self, user: UserId) -> StoreResult<ReadingSummary> {
        Ok(sqlx::query_as::<_, ReadingSummary>(
            r#"
            SELECT COUNT(*) AS total_documents,
                   COALESCE(SUM(page_count), 0)::BIGINT AS total_pages,
                   AVG(reading_progress)::FLOAT8 AS avg_progress
            FROM documents
            WHERE user_id = $1
            "#,
        )
        .bind(user.get())
        .fetch_one(self.pool())
        .await?)
    }

    async fn learning_trend(&self, user: UserId, since: NaiveDate) -> StoreResult<Vec<TrendPoint>> {
        Ok(sqlx::query_as::<_, TrendPoint>(
            r#"
            SELECT date, words_studied
            FROM daily_learning_stats
            WHERE user_id = $1 AND date >= $2
            ORDER BY date
            "#,
        )
        .bind(user.get())
        .bind(since)
        .fetch_all(self.pool())
        .await?)
    }

    async fn due_words(
        &self,
        user: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DueWord>> {
        Ok(sqlx::query_as::<_, DueWord>(
            r#"
            SELECT uv.vocabulary_id, w.word, w.phonetic, w.definition AS meaning,
                   uv.mastery_level, uv.next_review_date
            FROM user_vocabulary uv
            JOIN words w ON w.word_id = uv.word_id
            WHERE uv.user_id = $1 AND uv.next_review_date BETWEEN $2 AND $3
            ORDER BY uv.next_review_date, uv.mastery_level, uv.vocabulary_id
            "#,
        )
        .bind(user.get())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?)
    }

    async fn anki_cards(&self, user: UserId, ids: &[i64]) -> StoreResult<Vec<AnkiCard>> {
        Ok(sqlx::query_as::<_, AnkiCard>(
            r#"
            SELECT uv.vocabulary_id, w.word, w.phonetic, w.definition AS meaning,
                   w.part_of_speech, ex.example_sentence, ex.translation
            FROM user_vocabulary uv
            JOIN words w ON w.word_id = uv.word_id
            LEFT JOIN LATERAL (
                SELECT e.example_sentence, e.translation
                FROM word_examples e
                WHERE e.word_id = w.word_id
                ORDER BY e.example_id
                LIMIT 1
            ) ex ON TRUE
            WHERE uv.user_id = $1 AND uv.vocabulary_id = ANY($2)
            ORDER BY uv.vocabulary_id
            "#,
        )
        .bind(user.get())
        .bind(ids)
        .fetch_all(self.pool())
        .await?)
    }

    async fn user_info(&self, user: UserId) -> StoreResult<Option<UserInfo>> {
        Ok(sqlx::query_as::<_, UserInfo>(
            r#"
            SELECT user_id, username, email, nickname, avatar_url, role, is_verified,
                   created_at, last_login_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user.get())
        .fetch_optional(self.pool())
        .await?)
    }

    async fn settings(&self, user: UserId) -> StoreResult<Vec<UserSetting>> {
        Ok(sqlx::query_as::<_, UserSetting>(
            r#"SELECT setting_key, setting_value FROM user_settings WHERE user_id = $1 ORDER BY setting_key"#,
        )
        .bind(user.get())
        .fetch_all(self.pool())
        .await?)
    }
}
