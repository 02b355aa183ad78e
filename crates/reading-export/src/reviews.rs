//! Review session export.

use chrono::{DateTime, Utc};
use reading_core::{ExportFormat, ExportKind, ReviewItem, ReviewSession};
use serde::Serialize;

use crate::error::{ensure_supported, RenderResult};
use crate::layout::{opt, opt_timestamp, or_dash, timestamp, Csv, TextReport};

#[derive(Debug, Clone, Copy)]
pub struct ReviewsExport<'a> {
    pub sessions: &'a [ReviewSession],
    pub items: &'a [ReviewItem],
}

#[derive(Serialize)]
struct SessionJson<'a> {
    #[serde(flatten)]
    session: &'a ReviewSession,
    items: Vec<&'a ReviewItem>,
}

#[derive(Serialize)]
struct ReviewsJson<'a> {
    exported_at: DateTime<Utc>,
    total_sessions: usize,
    total_items: usize,
    sessions: Vec<SessionJson<'a>>,
}

impl<'a> ReviewsExport<'a> {
    fn items_of(&self, session_id: i64) -> impl Iterator<Item = &'a ReviewItem> {
        self.items
            .iter()
            .filter(move |i| i.review_session_id == session_id)
    }

    pub fn render(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        ensure_supported(ExportKind::Reviews, format)?;
        match format {
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(&ReviewsJson {
                exported_at,
                total_sessions: self.sessions.len(),
                total_items: self.items.len(),
                sessions: self
                    .sessions
                    .iter()
                    .map(|session| SessionJson {
                        session,
                        items: self.items_of(session.review_session_id).collect(),
                    })
                    .collect(),
            })?),
            ExportFormat::Csv => Ok(self.csv()),
            _ => Ok(self.text(exported_at)),
        }
    }

    fn csv(&self) -> Vec<u8> {
        let mut csv = Csv::new();
        csv.row([
            "Session ID",
            "Start Time",
            "End Time",
            "Total Items",
            "Correct",
            "Wrong",
            "Accuracy (%)",
            "Session Type",
        ]);
        for session in self.sessions {
            csv.row([
                session.review_session_id.to_string(),
                opt_timestamp(session.start_time),
                opt_timestamp(session.end_time),
                session.total_items.to_string(),
                session.correct_count.to_string(),
                session.wrong_count.to_string(),
                session.accuracy.map(|a| format!("{a:.1}")).unwrap_or_default(),
                opt(session.session_type.as_deref()),
            ]);
        }

        if !self.items.is_empty() {
            csv.blank();
            csv.row([
                "Session ID",
                "Item ID",
                "Word",
                "Answer",
                "Correct",
                "Response Time (ms)",
                "Answered At",
            ]);
            for session in self.sessions {
                for item in self.items_of(session.review_session_id) {
                    csv.row([
                        item.review_session_id.to_string(),
                        item.review_item_id.to_string(),
                        item.word.clone(),
                        opt(item.answer.as_deref()),
                        if item.is_correct { "yes" } else { "no" }.to_string(),
                        opt(item.response_time_ms),
                        timestamp(item.created_at),
                    ]);
                }
            }
        }

        csv.into_bytes()
    }

    fn text(&self, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut report = TextReport::new("Review Sessions", exported_at);
        report.field("Sessions", self.sessions.len());
        report.field("Items", self.items.len());

        for session in self.sessions {
            report.section(&format!(
                "Session {} ({})",
                session.review_session_id,
                timestamp(session.created_at)
            ));
            report.field("Type", or_dash(session.session_type.as_deref()));
            report.field(
                "Result",
                format!(
                    "{} correct, {} wrong of {}",
                    session.correct_count, session.wrong_count, session.total_items
                ),
            );
            report.field(
                "Accuracy",
                session
                    .accuracy
                    .map(|a| format!("{a:.1}%"))
                    .unwrap_or_else(|| "-".to_string()),
            );
            for item in self.items_of(session.review_session_id) {
                report.line(format!(
                    "  [{}] {} -> {}",
                    if item.is_correct { "x" } else { " " },
                    item.word,
                    or_dash(item.answer.as_deref())
                ));
            }
        }

        report.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: i64) -> ReviewSession {
        ReviewSession {
            review_session_id: id,
            start_time: None,
            end_time: None,
            total_items: 2,
            correct_count: 1,
            wrong_count: 1,
            accuracy: Some(50.0),
            session_type: Some("daily".to_string()),
            created_at: Utc::now(),
        }
    }

    fn item(id: i64, session: i64, word: &str, correct: bool) -> ReviewItem {
        ReviewItem {
            review_item_id: id,
            review_session_id: session,
            vocabulary_id: id,
            word: word.to_string(),
            answer: Some(word.to_string()),
            is_correct: correct,
            response_time_ms: Some(1200),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn json_nests_items_under_sessions() {
        let sessions = [session(1), session(2)];
        let items = [item(10, 1, "apple", true), item(11, 1, "brief", false)];
        let export = ReviewsExport {
            sessions: &sessions,
            items: &items,
        };
        let json: serde_json::Value =
            serde_json::from_slice(&export.render(ExportFormat::Json, Utc::now()).unwrap()).unwrap();

        assert_eq!(json["total_sessions"], 2);
        assert_eq!(json["sessions"][0]["items"].as_array().unwrap().len(), 2);
        assert_eq!(json["sessions"][1]["items"].as_array().unwrap().len(), 0);
        assert_eq!(json["sessions"][0]["review_session_id"], 1);
    }

    #[test]
    fn csv_lists_sessions_then_items() {
        let sessions = [session(1)];
        let items = [item(10, 1, "apple", true)];
        let export = ReviewsExport {
            sessions: &sessions,
            items: &items,
        };
        let csv = String::from_utf8(export.render(ExportFormat::Csv, Utc::now()).unwrap()).unwrap();
        let blocks: Vec<&str> = csv.split("\n\n").collect();

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].lines().nth(1).unwrap().starts_with("1,,,2,1,1,50.0,daily"));
        assert!(blocks[1].lines().nth(1).unwrap().starts_with("1,10,apple,apple,yes,1200,"));
    }

    #[test]
    fn html_is_not_offered() {
        let export = ReviewsExport {
            sessions: &[],
            items: &[],
        };
        assert!(export.render(ExportFormat::Html, Utc::now()).is_err());
    }
}
