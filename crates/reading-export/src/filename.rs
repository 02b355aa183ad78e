//! Download filenames.

use chrono::{Local, NaiveDateTime};

const FILENAME_TIMESTAMP: &str = "%Y-%m-%d_%H-%M-%S";

/// `<prefix>_<yyyy-MM-dd_HH-mm-ss>.<extension>` for the given wall-clock time.
pub fn export_filename(prefix: &str, extension: &str, at: NaiveDateTime) -> String {
    format!("{prefix}_{}.{extension}", at.format(FILENAME_TIMESTAMP))
}

/// [`export_filename`] stamped with the server's local time.
pub fn export_filename_now(prefix: &str, extension: &str) -> String {
    export_filename(prefix, extension, Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn filename_embeds_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 3, 7)
            .unwrap();
        assert_eq!(
            export_filename("vocabulary", "csv", at),
            "vocabulary_2024-01-05_09-03-07.csv"
        );
        assert_eq!(
            export_filename("highlights_12", "json", at),
            "highlights_12_2024-01-05_09-03-07.json"
        );
    }
}
