//! Full-account JSON snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reading_core::{
    Achievement, DailyStat, Document, Highlight, Note, ReadingRecord, ReviewSession, UserId,
    UserInfo, UserSetting, VocabularyEntry,
};
use serde::Serialize;

use crate::error::RenderResult;

/// Section names, in output order.
pub const DATA_SECTIONS: [&str; 10] = [
    "user_info",
    "documents",
    "vocabulary",
    "reviews",
    "learning_stats",
    "notes",
    "highlights",
    "reading_history",
    "settings",
    "achievements",
];

/// Snapshot format version.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Everything one user owns.
#[derive(Debug, Clone, Default)]
pub struct AllData {
    pub user_info: Option<UserInfo>,
    pub documents: Vec<Document>,
    pub vocabulary: Vec<VocabularyEntry>,
    pub reviews: Vec<ReviewSession>,
    pub learning_stats: Vec<DailyStat>,
    pub notes: Vec<Note>,
    pub highlights: Vec<Highlight>,
    pub reading_history: Vec<ReadingRecord>,
    pub settings: Vec<UserSetting>,
    pub achievements: Vec<Achievement>,
}

impl AllData {
    /// Rows across every list section.
    pub fn item_count(&self) -> usize {
        self.documents.len()
            + self.vocabulary.len()
            + self.reviews.len()
            + self.learning_stats.len()
            + self.notes.len()
            + self.highlights.len()
            + self.reading_history.len()
            + self.settings.len()
            + self.achievements.len()
    }

    pub fn render(&self, user: UserId, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        let snapshot = Snapshot {
            metadata: Metadata {
                exported_at,
                user_id: user,
                format: "json",
                version: SNAPSHOT_VERSION,
                data_sections: &DATA_SECTIONS,
            },
            data: Sections {
                user_info: self.user_info.as_ref(),
                documents: &self.documents,
                vocabulary: &self.vocabulary,
                reviews: &self.reviews,
                learning_stats: &self.learning_stats,
                notes: &self.notes,
                highlights: &self.highlights,
                reading_history: &self.reading_history,
                settings: self
                    .settings
                    .iter()
                    .map(|s| (s.setting_key.as_str(), s.setting_value.as_deref()))
                    .collect(),
                achievements: &self.achievements,
            },
        };
        Ok(serde_json::to_vec_pretty(&snapshot)?)
    }
}

#[derive(Serialize)]
struct Metadata {
    exported_at: DateTime<Utc>,
    user_id: UserId,
    format: &'static str,
    version: &'static str,
    data_sections: &'static [&'static str],
}

#[derive(Serialize)]
struct Sections<'a> {
    user_info: Option<&'a UserInfo>,
    documents: &'a [Document],
    vocabulary: &'a [VocabularyEntry],
    reviews: &'a [ReviewSession],
    learning_stats: &'a [DailyStat],
    notes: &'a [Note],
    highlights: &'a [Highlight],
    reading_history: &'a [ReadingRecord],
    settings: BTreeMap<&'a str, Option<&'a str>>,
    achievements: &'a [Achievement],
}

#[derive(Serialize)]
struct Snapshot<'a> {
    metadata: Metadata,
    data: Sections<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lists_every_section() {
        let data = AllData {
            settings: vec![UserSetting {
                setting_key: "theme".to_string(),
                setting_value: Some("dark".to_string()),
            }],
            ..AllData::default()
        };
        let json: serde_json::Value =
            serde_json::from_slice(&data.render(UserId(3), Utc::now()).unwrap()).unwrap();

        assert_eq!(json["metadata"]["user_id"], 3);
        assert_eq!(json["metadata"]["version"], "1.0");
        assert_eq!(json["metadata"]["data_sections"].as_array().unwrap().len(), 10);
        for section in DATA_SECTIONS {
            assert!(json["data"].get(section).is_some(), "missing {section}");
        }
        assert_eq!(json["data"]["settings"]["theme"], "dark");
        assert!(json["data"]["user_info"].is_null());
        assert_eq!(data.item_count(), 1);
    }
}
