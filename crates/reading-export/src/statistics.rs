//! Learning statistics report.
//!
//! Six sections: recent daily activity, mastery distribution, achievements,
//! review totals, reading totals and the last week's learning trend. With
//! `include_charts` the JSON output gains a `charts` block of chart-ready
//! series and the text report gains bar charts.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use reading_core::{
    Achievement, DailyStat, ExportFormat, ExportKind, MasteryBucket, ReadingSummary,
    ReviewSummary, TrendPoint,
};
use serde::Serialize;

use crate::error::{ensure_supported, RenderResult};
use crate::layout::{opt, timestamp, Csv, TextReport};

/// Daily stat rows included in the report.
pub const DAILY_STATS_LIMIT: i64 = 30;

/// Days covered by the learning trend.
pub const TREND_DAYS: i64 = 7;

/// Widest bar in a text chart.
const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct StatisticsExport<'a> {
    /// `None` covers all recorded days.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub include_charts: bool,
    pub daily_stats: &'a [DailyStat],
    pub mastery: &'a [MasteryBucket],
    pub achievements: &'a [Achievement],
    pub review: &'a ReviewSummary,
    pub reading: &'a ReadingSummary,
    pub trend: &'a [TrendPoint],
}

#[derive(Serialize)]
struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Serialize)]
struct Series<L: Serialize> {
    labels: Vec<L>,
    values: Vec<i64>,
}

#[derive(Serialize)]
struct Charts {
    study_time: Series<NaiveDate>,
    mastery_distribution: Series<i32>,
    learning_trend: Series<NaiveDate>,
}

#[derive(Serialize)]
struct StatisticsJson<'a> {
    exported_at: DateTime<Utc>,
    date_range: Option<DateRange>,
    daily_stats: &'a [DailyStat],
    vocabulary_stats: &'a [MasteryBucket],
    achievements: &'a [Achievement],
    review_stats: &'a ReviewSummary,
    reading_stats: &'a ReadingSummary,
    learning_trend: &'a [TrendPoint],
    #[serde(skip_serializing_if = "Option::is_none")]
    charts: Option<Charts>,
}

impl StatisticsExport<'_> {
    /// Daily stats oldest first, as charts read left to right.
    fn chronological(&self) -> Vec<&DailyStat> {
        let mut days: Vec<&DailyStat> = self.daily_stats.iter().collect();
        days.sort_by_key(|d| d.date);
        days
    }

    fn charts(&self) -> Charts {
        let days = self.chronological();
        Charts {
            study_time: Series {
                labels: days.iter().map(|d| d.date).collect(),
                values: days.iter().map(|d| i64::from(d.total_study_time)).collect(),
            },
            mastery_distribution: Series {
                labels: self.mastery.iter().map(|b| b.mastery_level).collect(),
                values: self.mastery.iter().map(|b| b.count).collect(),
            },
            learning_trend: Series {
                labels: self.trend.iter().map(|p| p.date).collect(),
                values: self.trend.iter().map(|p| i64::from(p.words_studied)).collect(),
            },
        }
    }

    pub fn render(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        ensure_supported(ExportKind::Statistics, format)?;
        match format {
            ExportFormat::Json => Ok(serde_json::to_vec_pretty(&StatisticsJson {
                exported_at,
                date_range: self.date_range.map(|(start, end)| DateRange { start, end }),
                daily_stats: self.daily_stats,
                vocabulary_stats: self.mastery,
                achievements: self.achievements,
                review_stats: self.review,
                reading_stats: self.reading,
                learning_trend: self.trend,
                charts: self.include_charts.then(|| self.charts()),
            })?),
            ExportFormat::Csv => Ok(self.csv()),
            _ => Ok(self.text(exported_at)),
        }
    }

    fn csv(&self) -> Vec<u8> {
        let mut csv = Csv::new();
        csv.row([
            "Date",
            "Study Time",
            "Words Studied",
            "Documents Read",
            "Notes Created",
            "Highlights Created",
        ]);
        for d in self.daily_stats {
            csv.row([
                d.date.to_string(),
                d.total_study_time.to_string(),
                d.words_studied.to_string(),
                d.documents_read.to_string(),
                d.notes_created.to_string(),
                d.highlights_created.to_string(),
            ]);
        }

        csv.blank();
        csv.row(["Mastery Level", "Words"]);
        for b in self.mastery {
            csv.row([b.mastery_level.to_string(), b.count.to_string()]);
        }

        csv.blank();
        csv.row(["Metric", "Value"]);
        csv.row(["Review Sessions".to_string(), self.review.total_sessions.to_string()]);
        csv.row(["Review Items".to_string(), self.review.total_items.to_string()]);
        csv.row(["Correct Answers".to_string(), self.review.total_correct.to_string()]);
        csv.row([
            "Average Accuracy".to_string(),
            self.review.avg_accuracy.map(|a| format!("{a:.1}")).unwrap_or_default(),
        ]);
        csv.row(["Documents".to_string(), self.reading.total_documents.to_string()]);
        csv.row(["Pages".to_string(), self.reading.total_pages.to_string()]);
        csv.row([
            "Average Progress".to_string(),
            self.reading.avg_progress.map(|p| format!("{p:.1}")).unwrap_or_default(),
        ]);
        csv.row(["Achievements".to_string(), self.achievements.len().to_string()]);

        csv.blank();
        csv.row(["Trend Date", "Words Studied"]);
        for p in self.trend {
            csv.row([p.date.to_string(), p.words_studied.to_string()]);
        }

        csv.into_bytes()
    }

    fn text(&self, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut report = TextReport::new("Learning Statistics", exported_at);
        match self.date_range {
            Some((start, end)) => report.field("Period", format!("{start} to {end}")),
            None => report.field("Period", "all time"),
        }

        report.section("Reviews");
        report.field("Sessions", self.review.total_sessions);
        report.field("Items", self.review.total_items);
        report.field("Correct", self.review.total_correct);
        report.field(
            "Average accuracy",
            self.review
                .avg_accuracy
                .map(|a| format!("{a:.1}%"))
                .unwrap_or_else(|| "-".to_string()),
        );

        report.section("Reading");
        report.field("Documents", self.reading.total_documents);
        report.field("Pages", self.reading.total_pages);
        report.field(
            "Average progress",
            self.reading
                .avg_progress
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_else(|| "-".to_string()),
        );

        report.section("Vocabulary mastery");
        for b in self.mastery {
            report.line(format!("Level {:>3}: {} words", b.mastery_level, b.count));
        }

        report.section("Daily activity");
        for d in self.daily_stats {
            report.line(format!(
                "{}  {} min, {} words, {} documents, {} notes, {} highlights",
                d.date,
                d.total_study_time,
                d.words_studied,
                d.documents_read,
                d.notes_created,
                d.highlights_created
            ));
        }

        report.section("Achievements");
        for a in self.achievements {
            report.line(format!(
                "{} ({} points) unlocked {}",
                a.name,
                a.points,
                timestamp(a.unlocked_at)
            ));
            if a.description.is_some() {
                report.line(format!("    {}", opt(a.description.as_deref())));
            }
        }

        report.section("Learning trend");
        for p in self.trend {
            report.line(format!("{}  {}", p.date, p.words_studied));
        }

        if self.include_charts {
            let charts = self.charts();
            report.section("Chart: study time");
            bar_chart(&mut report, &charts.study_time);
            report.section("Chart: words per day");
            bar_chart(&mut report, &charts.learning_trend);
        }

        report.into_bytes()
    }
}

/// One `#`-bar per label, scaled so the largest value spans [`BAR_WIDTH`].
fn bar_chart<L: Serialize + Display>(report: &mut TextReport, series: &Series<L>) {
    let max = series.values.iter().copied().max().unwrap_or(0).max(1);
    for (label, value) in series.labels.iter().zip(&series.values) {
        let bar = "#".repeat(((*value).max(0) * BAR_WIDTH as i64 / max) as usize);
        report.line(format!("{label}  {bar:<width$} {value}", width = BAR_WIDTH));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, minutes: i32, words: i32) -> DailyStat {
        DailyStat {
            date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            total_study_time: minutes,
            words_studied: words,
            documents_read: 1,
            notes_created: 0,
            highlights_created: 2,
        }
    }

    struct Fixture {
        days: Vec<DailyStat>,
        mastery: Vec<MasteryBucket>,
        review: ReviewSummary,
        reading: ReadingSummary,
        trend: Vec<TrendPoint>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                days: vec![day(3, 40, 12), day(2, 20, 6)],
                mastery: vec![
                    MasteryBucket { mastery_level: 20, count: 4 },
                    MasteryBucket { mastery_level: 80, count: 1 },
                ],
                review: ReviewSummary {
                    total_sessions: 3,
                    total_items: 30,
                    total_correct: 24,
                    avg_accuracy: Some(80.0),
                },
                reading: ReadingSummary::default(),
                trend: vec![TrendPoint {
                    date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
                    words_studied: 12,
                }],
            }
        }

        fn export(&self, include_charts: bool) -> StatisticsExport<'_> {
            StatisticsExport {
                date_range: None,
                include_charts,
                daily_stats: &self.days,
                mastery: &self.mastery,
                achievements: &[],
                review: &self.review,
                reading: &self.reading,
                trend: &self.trend,
            }
        }
    }

    #[test]
    fn json_has_all_sections_and_charts_only_on_request() {
        let fixture = Fixture::new();
        let plain: serde_json::Value = serde_json::from_slice(
            &fixture.export(false).render(ExportFormat::Json, Utc::now()).unwrap(),
        )
        .unwrap();
        for section in [
            "daily_stats",
            "vocabulary_stats",
            "achievements",
            "review_stats",
            "reading_stats",
            "learning_trend",
        ] {
            assert!(plain.get(section).is_some(), "missing {section}");
        }
        assert!(plain.get("charts").is_none());
        assert!(plain["date_range"].is_null());

        let charted: serde_json::Value = serde_json::from_slice(
            &fixture.export(true).render(ExportFormat::Json, Utc::now()).unwrap(),
        )
        .unwrap();
        assert_eq!(charted["charts"]["study_time"]["values"], serde_json::json!([20, 40]));
        assert_eq!(charted["charts"]["mastery_distribution"]["labels"], serde_json::json!([20, 80]));
    }

    #[test]
    fn text_charts_scale_to_largest_value() {
        let fixture = Fixture::new();
        let text = String::from_utf8(
            fixture.export(true).render(ExportFormat::Pdf, Utc::now()).unwrap(),
        )
        .unwrap();
        assert!(text.contains("Chart: study time"));
        assert!(text.contains(&"#".repeat(BAR_WIDTH)));
        assert!(text.contains(&format!("2024-05-02  {} ", "#".repeat(BAR_WIDTH / 2))));
    }

    #[test]
    fn csv_contains_review_metrics() {
        let fixture = Fixture::new();
        let csv = String::from_utf8(
            fixture.export(false).render(ExportFormat::Csv, Utc::now()).unwrap(),
        )
        .unwrap();
        assert!(csv.contains("Review Sessions,3\n"));
        assert!(csv.contains("Average Accuracy,80.0\n"));
        assert!(csv.starts_with("Date,Study Time,"));
    }
}
