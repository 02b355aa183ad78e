//! Vocabulary export with optional examples and summary statistics.

use chrono::{DateTime, Utc};
use reading_core::{ExportFormat, ExportKind, VocabularyEntry, WordExample};
use serde::Serialize;

use crate::error::{ensure_supported, RenderResult};
use crate::layout::{opt, opt_timestamp, or_dash, Csv, TextReport};

/// Mastery level from which a word counts as mastered.
pub const MASTERED_LEVEL: i32 = 80;

/// Examples kept per word.
pub const EXAMPLES_PER_WORD: i64 = 5;

#[derive(Debug, Clone, Copy)]
pub struct VocabularyExport<'a> {
    pub entries: &'a [VocabularyEntry],
    /// `None` when examples were not requested.
    pub examples: Option<&'a [WordExample]>,
    pub include_statistics: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyStatistics {
    pub total_words: usize,
    pub mastered_words: usize,
    pub average_mastery: f64,
    pub total_study_count: i64,
    pub overall_accuracy: f64,
}

impl VocabularyStatistics {
    pub fn from_entries(entries: &[VocabularyEntry]) -> Self {
        let total_words = entries.len();
        let total_study_count: i64 = entries.iter().map(|e| i64::from(e.study_count)).sum();
        let total_correct: i64 = entries.iter().map(|e| i64::from(e.correct_count)).sum();
        let mastery_sum: i64 = entries.iter().map(|e| i64::from(e.mastery_level)).sum();

        Self {
            total_words,
            mastered_words: entries
                .iter()
                .filter(|e| e.mastery_level >= MASTERED_LEVEL)
                .count(),
            average_mastery: if total_words == 0 {
                0.0
            } else {
                mastery_sum as f64 / total_words as f64
            },
            total_study_count,
            overall_accuracy: if total_study_count == 0 {
                0.0
            } else {
                total_correct as f64 * 100.0 / total_study_count as f64
            },
        }
    }
}

#[derive(Serialize)]
struct VocabularyItem<'a> {
    #[serde(flatten)]
    entry: &'a VocabularyEntry,
    accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    examples: Option<Vec<&'a WordExample>>,
}

#[derive(Serialize)]
struct VocabularyJson<'a> {
    exported_at: DateTime<Utc>,
    total_words: usize,
    vocabulary: Vec<VocabularyItem<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<VocabularyStatistics>,
}

impl<'a> VocabularyExport<'a> {
    fn examples_for(&self, vocabulary_id: i64) -> impl Iterator<Item = &'a WordExample> {
        self.examples
            .unwrap_or_default()
            .iter()
            .filter(move |e| e.vocabulary_id == vocabulary_id)
    }

    fn statistics(&self) -> Option<VocabularyStatistics> {
        self.include_statistics
            .then(|| VocabularyStatistics::from_entries(self.entries))
    }

    pub fn render(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RenderResult<Vec<u8>> {
        ensure_supported(ExportKind::Vocabulary, format)?;
        match format {
            ExportFormat::Json => {
                let vocabulary = self
                    .entries
                    .iter()
                    .map(|entry| VocabularyItem {
                        entry,
                        accuracy: entry.accuracy(),
                        examples: self
                            .examples
                            .map(|_| self.examples_for(entry.vocabulary_id).collect()),
                    })
                    .collect();
                Ok(serde_json::to_vec_pretty(&VocabularyJson {
                    exported_at,
                    total_words: self.entries.len(),
                    vocabulary,
                    statistics: self.statistics(),
                })?)
            }
            ExportFormat::Csv => Ok(self.csv()),
            _ => Ok(self.text(exported_at)),
        }
    }

    fn csv(&self) -> Vec<u8> {
        let mut csv = Csv::new();
        csv.row([
            "Word",
            "Phonetic",
            "Meaning",
            "Part of Speech",
            "Difficulty",
            "Mastery Level",
            "Study Count",
            "Accuracy (%)",
            "Last Studied",
        ]);
        for entry in self.entries {
            csv.row([
                entry.word.clone(),
                opt(entry.phonetic.as_deref()),
                opt(entry.meaning.as_deref()),
                opt(entry.part_of_speech.as_deref()),
                opt(entry.difficulty),
                entry.mastery_level.to_string(),
                entry.study_count.to_string(),
                format!("{:.1}", entry.accuracy()),
                opt_timestamp(entry.last_studied_at),
            ]);
        }

        if self.examples.is_some() {
            csv.blank();
            csv.row(["Word", "Example", "Translation"]);
            for entry in self.entries {
                for example in self.examples_for(entry.vocabulary_id) {
                    csv.row([
                        entry.word.clone(),
                        example.example_sentence.clone(),
                        opt(example.translation.as_deref()),
                    ]);
                }
            }
        }

        if let Some(stats) = self.statistics() {
            csv.blank();
            csv.row(["Statistic", "Value"]);
            csv.row(["Total Words".to_string(), stats.total_words.to_string()]);
            csv.row(["Mastered Words".to_string(), stats.mastered_words.to_string()]);
            csv.row([
                "Average Mastery".to_string(),
                format!("{:.1}", stats.average_mastery),
            ]);
            csv.row(["Total Study Count".to_string(), stats.total_study_count.to_string()]);
            csv.row([
                "Overall Accuracy (%)".to_string(),
                format!("{:.1}", stats.overall_accuracy),
            ]);
        }

        csv.into_bytes()
    }

    fn text(&self, exported_at: DateTime<Utc>) -> Vec<u8> {
        let mut report = TextReport::new("Vocabulary Export", exported_at);
        report.field("Words", self.entries.len());

        for (index, entry) in self.entries.iter().enumerate() {
            report.section(&format!("{}. {}", index + 1, entry.word));
            report.field("Phonetic", or_dash(entry.phonetic.as_deref()));
            report.field("Meaning", or_dash(entry.meaning.as_deref()));
            report.field("Part of speech", or_dash(entry.part_of_speech.as_deref()));
            report.field("Mastery", entry.mastery_level);
            report.field("Accuracy", format!("{:.1}%", entry.accuracy()));
            report.field("Next review", or_dash(entry.next_review_date));
            for example in self.examples_for(entry.vocabulary_id) {
                match &example.translation {
                    Some(translation) => {
                        report.line(format!("  - {} ({})", example.example_sentence, translation))
                    }
                    None => report.line(format!("  - {}", example.example_sentence)),
                }
            }
        }

        if let Some(stats) = self.statistics() {
            report.section("Statistics");
            report.field("Total words", stats.total_words);
            report.field("Mastered words", stats.mastered_words);
            report.field("Average mastery", format!("{:.1}", stats.average_mastery));
            report.field("Total study count", stats.total_study_count);
            report.field("Overall accuracy", format!("{:.1}%", stats.overall_accuracy));
        }

        report.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, word: &str, mastery: i32, studied: i32, correct: i32) -> VocabularyEntry {
        VocabularyEntry {
            vocabulary_id: id,
            word: word.to_string(),
            phonetic: Some("/wɜːd/".to_string()),
            meaning: Some("a unit of language, spoken or written".to_string()),
            part_of_speech: Some("noun".to_string()),
            difficulty: Some(2),
            mastery_level: mastery,
            study_count: studied,
            correct_count: correct,
            wrong_count: studied - correct,
            last_studied_at: None,
            next_review_date: None,
            created_at: Utc::now(),
        }
    }

    fn entries() -> Vec<VocabularyEntry> {
        vec![
            entry(1, "apple", 90, 10, 9),
            entry(2, "brief", 40, 10, 5),
            entry(3, "candid", 80, 0, 0),
        ]
    }

    #[test]
    fn statistics_count_mastered_and_accuracy() {
        let stats = VocabularyStatistics::from_entries(&entries());
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.mastered_words, 2);
        assert!((stats.average_mastery - 70.0).abs() < 1e-9);
        assert_eq!(stats.total_study_count, 20);
        assert!((stats.overall_accuracy - 70.0).abs() < 1e-9);
    }

    #[test]
    fn json_total_matches_csv_rows() {
        let entries = entries();
        let examples = [WordExample {
            vocabulary_id: 1,
            example_sentence: "An apple a day, they say.".to_string(),
            translation: None,
        }];
        let export = VocabularyExport {
            entries: &entries,
            examples: Some(&examples),
            include_statistics: true,
        };

        let json: serde_json::Value =
            serde_json::from_slice(&export.render(ExportFormat::Json, Utc::now()).unwrap()).unwrap();
        let csv = String::from_utf8(export.render(ExportFormat::Csv, Utc::now()).unwrap()).unwrap();
        let data_rows = csv
            .split("\n\n")
            .next()
            .unwrap()
            .lines()
            .skip(1)
            .count();

        assert_eq!(json["total_words"], 3);
        assert_eq!(data_rows, 3);
        assert_eq!(json["vocabulary"][0]["examples"][0]["example_sentence"], "An apple a day, they say.");
        assert_eq!(json["statistics"]["mastered_words"], 2);
    }

    #[test]
    fn csv_quotes_meanings_with_commas() {
        let entries = entries();
        let export = VocabularyExport {
            entries: &entries[..1],
            examples: None,
            include_statistics: false,
        };
        let csv = String::from_utf8(export.render(ExportFormat::Csv, Utc::now()).unwrap()).unwrap();
        assert!(csv.contains("\"a unit of language, spoken or written\""));
        assert!(csv.contains(",90.0,"));
        assert!(!csv.contains("Statistic,Value"));
    }

    #[test]
    fn examples_are_omitted_from_json_when_not_requested() {
        let entries = entries();
        let export = VocabularyExport {
            entries: &entries,
            examples: None,
            include_statistics: false,
        };
        let json: serde_json::Value =
            serde_json::from_slice(&export.render(ExportFormat::Json, Utc::now()).unwrap()).unwrap();
        assert!(json["vocabulary"][0].get("examples").is_none());
        assert!(json.get("statistics").is_none());
    }
}
