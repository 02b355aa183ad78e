//! Day-by-day review schedule built from due vocabulary.
//!
//! Every day of the range gets an entry. When more words fall due on a day
//! than the daily goal allows, the weakest words (lowest mastery, then
//! lowest vocabulary id) are kept and the rest are deferred.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use reading_core::DueWord;

use crate::layout::TextReport;

/// Longest plan accepted, in days, both ends included.
pub const MAX_PLAN_DAYS: i64 = 366;

/// Daily goal when the request leaves it out.
pub const DEFAULT_DAILY_GOAL: u32 = 20;

/// Number of days in `[start, end]`, both ends included.
pub fn plan_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// How heavy the due workload is against the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    None,
    Light,
    Moderate,
    Heavy,
}

impl Workload {
    /// Classify `due` words against a capacity of `daily_goal * days`.
    pub fn classify(due: usize, daily_goal: u32, days: i64) -> Self {
        let capacity = i64::from(daily_goal) * days;
        let due = due as i64;
        if due == 0 {
            Self::None
        } else if due <= capacity / 2 {
            Self::Light
        } else if due <= capacity {
            Self::Moderate
        } else {
            Self::Heavy
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDay {
    pub date: NaiveDate,
    /// Words due that day, before the daily goal was applied.
    pub due: usize,
    pub words: Vec<DueWord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyPlan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub daily_goal: u32,
    pub days: Vec<PlanDay>,
}

impl StudyPlan {
    /// Lay out `due` over `[start, end]`. Words dated outside the range are
    /// ignored. Callers validate that `start <= end`.
    pub fn build(start: NaiveDate, end: NaiveDate, daily_goal: u32, due: &[DueWord]) -> Self {
        let goal = daily_goal as usize;
        let days = (0..plan_days(start, end).max(0))
            .map(|offset| {
                let date = start + Duration::days(offset);
                let mut words: Vec<DueWord> = due
                    .iter()
                    .filter(|w| w.next_review_date == date)
                    .cloned()
                    .collect();
                let due_count = words.len();
                if words.len() > goal {
                    words.sort_by_key(|w| (w.mastery_level, w.vocabulary_id));
                    words.truncate(goal);
                }
                PlanDay {
                    date,
                    due: due_count,
                    words,
                }
            })
            .collect();

        Self {
            start,
            end,
            daily_goal,
            days,
        }
    }

    pub fn total_due(&self) -> usize {
        self.days.iter().map(|d| d.due).sum()
    }

    pub fn scheduled(&self) -> usize {
        self.days.iter().map(|d| d.words.len()).sum()
    }

    pub fn deferred(&self) -> usize {
        self.total_due() - self.scheduled()
    }

    pub fn workload(&self) -> Workload {
        Workload::classify(self.total_due(), self.daily_goal, self.days.len() as i64)
    }

    pub fn recommendation(&self) -> String {
        match self.workload() {
            Workload::None => "No words are due. A good time to learn new vocabulary.".to_string(),
            Workload::Light => {
                let per_day = self.total_due() as i64 / (self.days.len().max(1) as i64);
                format!(
                    "Light review load. Consider adding {} new words per day.",
                    i64::from(self.daily_goal) - per_day
                )
            }
            Workload::Moderate => "Moderate review load. Follow the plan as scheduled.".to_string(),
            Workload::Heavy => {
                "Heavy review load. Consider raising the daily goal or adding study time."
                    .to_string()
            }
        }
    }

    pub fn render_text(&self, include_progress: bool, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut report = TextReport::new("Study Plan", exported_at);
        report.field("Period", format!("{} to {}", self.start, self.end));
        report.field("Daily goal", format!("{} words", self.daily_goal));

        report.section("Daily schedule");
        for day in &self.days {
            report.line(format!("{} ({} words)", day.date, day.words.len()));
            if day.words.is_empty() {
                report.line("  nothing to review");
            }
            for (n, word) in day.words.iter().enumerate() {
                let mut line = format!("  {}. {}", n + 1, word.word);
                if let Some(phonetic) = word.phonetic.as_deref().filter(|p| !p.is_empty()) {
                    line.push_str(&format!(" [{phonetic}]"));
                }
                report.line(line);
                if let Some(meaning) = &word.meaning {
                    report.line(format!("     meaning: {meaning}"));
                }
                report.line(format!("     mastery: {}%", word.mastery_level));
            }
            report.blank();
        }

        let days = self.days.len().max(1);
        report.section("Summary");
        report.field("Days", self.days.len());
        report.field("Scheduled words", self.scheduled());
        report.field(
            "Average per day",
            format!("{:.1}", self.scheduled() as f64 / days as f64),
        );
        report.field("Workload", self.workload().as_str());
        report.field("Recommendation", self.recommendation());

        if include_progress {
            report.section("Progress");
            report.field("Total due", self.total_due());
            report.field("Scheduled", self.scheduled());
            report.field("Deferred", self.deferred());
        }

        report.into_bytes()
    }
}
