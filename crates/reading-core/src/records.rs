//! Row-shaped domain records.
//!
//! These map one-to-one onto the rows the store returns (joined columns
//! included) and are what the renderers consume. Every record is scoped to a
//! single user by the query that produced it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::format::TagKind;

// ============================================================================
// Reading Material
// ============================================================================

/// A document uploaded by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub document_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub page_count: Option<i32>,
    pub reading_progress: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note attached to a document, with the document title joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub note_id: i64,
    pub document_id: i64,
    pub document_title: Option<String>,
    pub page_number: Option<i32>,
    pub content: String,
    pub highlight_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Highlight {
    pub highlight_id: i64,
    pub document_id: i64,
    pub page_number: Option<i32>,
    pub text_content: String,
    pub color: Option<String>,
    pub start_position: Option<i32>,
    pub end_position: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// One reading session on a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingRecord {
    pub history_id: i64,
    pub document_id: i64,
    pub document_title: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i32>,
    pub pages_read: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Vocabulary
// ============================================================================

/// A word in the user's vocabulary list, joined with its dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VocabularyEntry {
    pub vocabulary_id: i64,
    pub word: String,
    pub phonetic: Option<String>,
    pub meaning: Option<String>,
    pub part_of_speech: Option<String>,
    pub difficulty: Option<i32>,
    pub mastery_level: i32,
    pub study_count: i32,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub last_studied_at: Option<DateTime<Utc>>,
    pub next_review_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl VocabularyEntry {
    /// Share of correct answers in percent; zero when never studied.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.study_count <= 0 {
            0.0
        } else {
            f64::from(self.correct_count) * 100.0 / f64::from(self.study_count)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WordExample {
    pub vocabulary_id: i64,
    pub example_sentence: String,
    pub translation: Option<String>,
}

/// A vocabulary entry due for review, as used by the study planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DueWord {
    pub vocabulary_id: i64,
    pub word: String,
    pub phonetic: Option<String>,
    pub meaning: Option<String>,
    pub mastery_level: i32,
    pub next_review_date: NaiveDate,
}

/// One flashcard row for the Anki deck export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnkiCard {
    pub vocabulary_id: i64,
    pub word: String,
    pub phonetic: Option<String>,
    pub meaning: Option<String>,
    pub part_of_speech: Option<String>,
    pub example_sentence: Option<String>,
    pub translation: Option<String>,
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewSession {
    pub review_session_id: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_items: i32,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub accuracy: Option<f64>,
    pub session_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One answered item inside a review session, with the word joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewItem {
    pub review_item_id: i64,
    pub review_session_id: i64,
    pub vocabulary_id: i64,
    pub word: String,
    pub answer: Option<String>,
    pub is_correct: bool,
    pub response_time_ms: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub total_study_time: i32,
    pub words_studied: i32,
    pub documents_read: i32,
    pub notes_created: i32,
    pub highlights_created: i32,
}

/// Number of vocabulary entries at one mastery level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MasteryBucket {
    pub mastery_level: i32,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Achievement {
    pub achievement_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub points: i32,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewSummary {
    pub total_sessions: i64,
    pub total_items: i64,
    pub total_correct: i64,
    pub avg_accuracy: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingSummary {
    pub total_documents: i64,
    pub total_pages: i64,
    pub avg_progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub words_studied: i32,
}

// ============================================================================
// Account
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserInfo {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSetting {
    pub setting_key: String,
    pub setting_value: Option<String>,
}

// ============================================================================
// Tags
// ============================================================================

/// A tag with its current usage count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub tag_id: i64,
    #[sqlx(try_from = "String")]
    pub kind: TagKind,
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entity carrying a tag, labelled by document title or word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaggedEntity {
    pub entity_id: i64,
    pub label: String,
    pub tagged_at: DateTime<Utc>,
}

// ============================================================================
// Export Bookkeeping
// ============================================================================

/// One row of the export audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExportRecord {
    pub export_id: String,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub operation_type: String,
    pub entity_type: String,
    pub entity_ids: Option<Vec<i64>>,
    pub format: String,
    pub status: String,
    pub item_count: i32,
    pub file_size: i64,
    pub filename: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A saved export configuration.
///
/// System templates are compiled in and carry `is_system = true` and no
/// owner; everything else is persisted per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExportTemplate {
    pub template_id: String,
    pub user_id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub export_type: String,
    pub format: String,
    pub description: Option<String>,
    pub config: serde_json::Value,
    pub is_default: bool,
    pub is_public: bool,
    #[sqlx(default)]
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(study_count: i32, correct_count: i32) -> VocabularyEntry {
        VocabularyEntry {
            vocabulary_id: 1,
            word: "ephemeral".to_string(),
            phonetic: None,
            meaning: None,
            part_of_speech: None,
            difficulty: None,
            mastery_level: 40,
            study_count,
            correct_count,
            wrong_count: study_count - correct_count,
            last_studied_at: None,
            next_review_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn accuracy_is_zero_before_first_study() {
        assert_eq!(entry(0, 0).accuracy(), 0.0);
    }

    #[test]
    fn accuracy_is_percentage_of_correct_answers() {
        assert!((entry(8, 6).accuracy() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn template_serializes_type_field() {
        let template = ExportTemplate {
            template_id: "tpl_1".to_string(),
            user_id: Some(3),
            name: "Weekly words".to_string(),
            export_type: "vocabulary".to_string(),
            format: "csv".to_string(),
            description: None,
            config: serde_json::json!({}),
            is_default: false,
            is_public: false,
            is_system: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["type"], "vocabulary");
        assert!(json.get("export_type").is_none());
    }
}
