//! Zip bundle of several exports.
//!
//! `README.txt` is always the first entry and lists every file in the
//! archive. Each section becomes `<type>.json` holding
//! `{metadata: {exported_at, type, count}, items}`.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use reading_core::{ExportKind, UserId};
use serde::Serialize;
use serde_json::Value;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::RenderResult;
use crate::layout::TextReport;

const README: &str = "README.txt";

/// One export kind's rows, already serialized.
#[derive(Debug, Clone)]
pub struct BatchSection {
    pub kind: ExportKind,
    pub count: usize,
    pub items: Value,
}

impl BatchSection {
    pub fn new<T: Serialize>(kind: ExportKind, items: &[T]) -> RenderResult<Self> {
        Ok(Self {
            kind,
            count: items.len(),
            items: serde_json::to_value(items)?,
        })
    }

    pub fn filename(&self) -> String {
        format!("{}.json", self.kind.as_str())
    }

    fn describe(&self) -> &'static str {
        match self.kind {
            ExportKind::Documents => "documents",
            ExportKind::Vocabulary => "vocabulary list",
            ExportKind::Reviews => "review sessions",
            ExportKind::Statistics => "daily learning statistics",
            ExportKind::Notes => "reading notes",
            ExportKind::Highlights => "document highlights",
            ExportKind::ReadingHistory => "reading history",
            _ => "export data",
        }
    }
}

#[derive(Serialize)]
struct SectionMetadata<'a> {
    exported_at: DateTime<Utc>,
    #[serde(rename = "type")]
    kind: &'a str,
    count: usize,
}

#[derive(Serialize)]
struct SectionFile<'a> {
    metadata: SectionMetadata<'a>,
    items: &'a Value,
}

/// A finished archive.
#[derive(Debug, Clone)]
pub struct BatchBundle {
    pub bytes: Vec<u8>,
    /// Entries in the archive, README included.
    pub file_count: usize,
    /// Size of the archive in bytes.
    pub total_size: usize,
}

fn readme(user: UserId, sections: &[BatchSection], exported_at: DateTime<Utc>) -> Vec<u8> {
    let mut report = TextReport::new("Batch Export", exported_at);
    report.field("User", user);
    report.field(
        "Types",
        sections
            .iter()
            .map(|s| s.kind.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );

    report.section("Files");
    for section in sections {
        report.line(format!(
            "* {} - {} ({} items)",
            section.filename(),
            section.describe(),
            section.count
        ));
    }
    report.line(format!("* {README} - this file"));

    report.section("Notes");
    report.line("Every data file is JSON with a metadata block and an items array.");
    report.line("Data covers the whole account up to the export time.");
    report.into_bytes()
}

/// Write the README and one JSON file per section into a deflated zip.
pub fn build_bundle(
    user: UserId,
    sections: &[BatchSection],
    exported_at: DateTime<Utc>,
) -> RenderResult<BatchBundle> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(README, options)?;
    zip.write_all(&readme(user, sections, exported_at))?;

    for section in sections {
        let file = SectionFile {
            metadata: SectionMetadata {
                exported_at,
                kind: section.kind.as_str(),
                count: section.count,
            },
            items: &section.items,
        };
        zip.start_file(section.filename(), options)?;
        zip.write_all(&serde_json::to_vec_pretty(&file)?)?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(user_id = %user, sections = sections.len(), size = bytes.len(), "built batch archive");

    Ok(BatchBundle {
        total_size: bytes.len(),
        file_count: sections.len() + 1,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use zip::ZipArchive;

    #[derive(Serialize)]
    struct Row {
        id: i64,
    }

    #[test]
    fn readme_comes_first_and_sections_follow() {
        let sections = vec![
            BatchSection::new(ExportKind::Documents, &[Row { id: 1 }, Row { id: 2 }]).unwrap(),
            BatchSection::new::<Row>(ExportKind::Notes, &[]).unwrap(),
        ];
        let bundle = build_bundle(UserId(7), &sections, Utc::now()).unwrap();
        assert_eq!(bundle.file_count, 3);
        assert_eq!(bundle.total_size, bundle.bytes.len());

        let mut archive = ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut readme = String::new();
        archive.by_index(0).unwrap().read_to_string(&mut readme).unwrap();
        assert!(readme.contains("documents.json"));
        assert!(readme.contains("notes.json"));
        assert!(readme.contains("README.txt"));

        let mut documents = String::new();
        archive
            .by_name("documents.json")
            .unwrap()
            .read_to_string(&mut documents)
            .unwrap();
        let json: Value = serde_json::from_str(&documents).unwrap();
        assert_eq!(json["metadata"]["type"], "documents");
        assert_eq!(json["metadata"]["count"], 2);
        assert_eq!(json["items"][1]["id"], 2);
    }
}
