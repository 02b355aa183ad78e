//! Format catalog served to clients choosing an export format.

use std::collections::BTreeMap;

use reading_core::{ExportFormat, ExportKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatInfo {
    pub name: &'static str,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub description: &'static str,
    pub recommended: bool,
    pub use_case: &'static str,
}

/// `format -> info` for one kind. The first allowed format is recommended.
pub fn formats_for(kind: ExportKind) -> BTreeMap<&'static str, FormatInfo> {
    let recommended = kind.recommended_format();
    kind.formats()
        .iter()
        .map(|&format: &ExportFormat| {
            (
                format.as_str(),
                FormatInfo {
                    name: format.display_name(),
                    mime_type: format.content_type(),
                    extension: format.extension(),
                    description: format.description(),
                    recommended: format == recommended,
                    use_case: kind.use_case(format),
                },
            )
        })
        .collect()
}

/// Catalog for one kind, or for every catalogued kind when `kind` is `None`.
pub fn format_catalog(
    kind: Option<ExportKind>,
) -> BTreeMap<&'static str, BTreeMap<&'static str, FormatInfo>> {
    let kinds: Vec<ExportKind> = match kind {
        Some(kind) => vec![kind],
        None => ExportKind::CATALOGUED.to_vec(),
    };
    kinds
        .into_iter()
        .map(|kind| (kind.as_str(), formats_for(kind)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_recommended_format_per_kind() {
        for (kind, formats) in format_catalog(None) {
            let recommended: Vec<_> = formats.iter().filter(|(_, f)| f.recommended).collect();
            assert_eq!(recommended.len(), 1, "{kind}");
        }
    }

    #[test]
    fn vocabulary_recommends_xlsx() {
        let formats = formats_for(ExportKind::Vocabulary);
        assert_eq!(formats.len(), 4);
        assert!(formats["xlsx"].recommended);
        assert_eq!(formats["csv"].mime_type, "text/csv");
        assert!(!formats.contains_key("html"));
    }

    #[test]
    fn single_kind_filter() {
        let catalog = format_catalog(Some(ExportKind::AllData));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog["all_data"]["json"].extension, "json");
        assert_eq!(format_catalog(None).len(), ExportKind::CATALOGUED.len());
    }
}
