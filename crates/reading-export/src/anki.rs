//! Anki-importable flashcard deck.

use reading_core::AnkiCard;

use crate::layout::{opt, Csv};

/// Format name recorded in the audit log for deck exports.
pub const ANKI_AUDIT_FORMAT: &str = "anki_csv";

/// Deck name when the request leaves it out.
pub const DEFAULT_DECK_NAME: &str = "Vocabulary";

/// One CSV row per card: word, phonetic, meaning, part of speech, example,
/// example translation.
pub fn render_anki(cards: &[AnkiCard]) -> Vec<u8> {
    let mut csv = Csv::new();
    csv.row([
        "Word",
        "Phonetic",
        "Meaning",
        "Part of Speech",
        "Example",
        "Translation",
    ]);
    for card in cards {
        csv.row([
            card.word.clone(),
            opt(card.phonetic.as_deref()),
            opt(card.meaning.as_deref()),
            opt(card.part_of_speech.as_deref()),
            opt(card.example_sentence.as_deref()),
            opt(card.translation.as_deref()),
        ]);
    }
    csv.into_bytes()
}
