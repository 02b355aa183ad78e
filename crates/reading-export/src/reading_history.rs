//! Reading session history.

use chrono::{DateTime, Utc};
use reading_core::{ExportFormat, ExportKind, ReadingRecord};
use serde::Serialize;

use crate::error::{ensure_supported, RenderResult};
use crate::layout::{opt, opt_timestamp, or_dash, timestamp, Csv, TextReport};

#[derive(Debug, Clone, Copy)]
pub struct ReadingHistoryExport<'a> {
    pub records: &'a [ReadingRecord],
}

#[derive(Serialize)]
struct HistoryJson<'a> {
    exported_at: DateTime<Utc>,
    total_records: usize,
    total_duration_seconds: i64,
    total_pages_read: i64,
    history: &'a [ReadingRecord],
}

impl ReadingHistoryExport<'_> {
    fn total_duration(&self) -> i64 {
        self.records
            .iter()
            .filter_map(|r| r.duration_seconds)
            .map(i64::from)
            .sum()
    }

    fn total_pages(&self) -> i64 {
        self.records
            .iter()
            .filter_map(|r| r.pages_read)
            .map(i64::from)
            .sum()
    }

    pub fn render(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        ensure_supported(ExportKind::ReadingHistory, format)?;
        match format {
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(&HistoryJson {
                exported_at,
                total_records: self.records.len(),
                total_duration_seconds: self.total_duration(),
                total_pages_read: self.total_pages(),
                history: self.records,
            })?),
            ExportFormat::Csv => {
                let mut csv = Csv::new();
                csv.row([
                    "History ID",
                    "Document ID",
                    "Document Title",
                    "Start Time",
                    "End Time",
                    "Duration (s)",
                    "Pages Read",
                ]);
                for r in self.records {
                    csv.row([
                        r.history_id.to_string(),
                        r.document_id.to_string(),
                        opt(r.document_title.as_deref()),
                        timestamp(r.start_time),
                        opt_timestamp(r.end_time),
                        opt(r.duration_seconds),
                        opt(r.pages_read),
                    ]);
                }
                Ok(csv.into_bytes())
            }
            _ => {
                let mut report = TextReport::new("Reading History", exported_at);
                report.field("Sessions", self.records.len());
                report.field("Total minutes", self.total_duration() / 60);
                report.field("Pages read", self.total_pages());
                report.blank();
                for r in self.records {
                    report.line(format!(
                        "{}  {}  {} min, {} pages",
                        timestamp(r.start_time),
                        r.document_title.as_deref().unwrap_or("Untitled document"),
                        r.duration_seconds.map(|s| s / 60).unwrap_or(0),
                        or_dash(r.pages_read)
                    ));
                }
                Ok(report.into_bytes())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, seconds: i32, pages: i32) -> ReadingRecord {
        ReadingRecord {
            history_id: id,
            document_id: 1,
            document_title: Some("Walden".to_string()),
            start_time: Utc::now(),
            end_time: None,
            duration_seconds: Some(seconds),
            pages_read: Some(pages),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn json_totals_durations_and_pages() {
        let records = [record(1, 600, 12), record(2, 1200, 20)];
        let export = ReadingHistoryExport { records: &records };
        let json: serde_json::Value =
            serde_json::from_slice(&export.render(ExportFormat::Json, Utc::now()).unwrap()).unwrap();

        assert_eq!(json["total_records"], 2);
        assert_eq!(json["total_duration_seconds"], 1800);
        assert_eq!(json["total_pages_read"], 32);
    }

    #[test]
    fn csv_joins_document_titles() {
        let records = [record(1, 600, 12)];
        let export = ReadingHistoryExport { records: &records };
        let csv = String::from_utf8(export.render(ExportFormat::Csv, Utc::now()).unwrap()).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("1,1,Walden,"));
    }
}
