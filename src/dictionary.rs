//! Fixed-phrase dictionary for the Japanese → English direction.
//!
//! Entries are only valid for ja → en, so every other language pair is a
//! miss without the table ever being consulted.

use std::collections::HashMap;
use std::sync::OnceLock;

const ENTRIES: &[(&str, &str)] = &[
    ("こんにちは", "Hello"),
    ("ありがとう", "Thank you"),
    ("ありがとうございます", "Thank you very much"),
    ("さようなら", "Goodbye"),
    ("おはよう", "Good morning"),
    ("おはようございます", "Good morning"),
    ("こんばんは", "Good evening"),
    ("はい", "Yes"),
    ("いいえ", "No"),
    ("おやすみなさい", "Good night"),
    ("すみません", "Excuse me"),
    ("ごめんなさい", "I am sorry"),
    ("お願いします", "Please"),
    ("いただきます", "Let's eat"),
    ("ごちそうさまでした", "Thank you for the meal"),
    ("これはペンです", "This is a pen"),
    ("これはペンです。", "This is a pen."),
    ("私は学生です", "I am a student"),
    ("私は学生です。", "I am a student."),
    ("今日はいい天気ですね", "It's nice weather today"),
    ("元気ですか", "How are you?"),
    ("元気ですか？", "How are you?"),
    ("お元気ですか", "How are you?"),
    ("お元気ですか？", "How are you?"),
];

static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn table() -> &'static HashMap<&'static str, &'static str> {
    TABLE.get_or_init(|| ENTRIES.iter().copied().collect())
}

/// Whether the dictionary applies to this language pair.
pub fn covers(source_lang: &str, target_lang: &str) -> bool {
    source_lang.eq_ignore_ascii_case("ja") && target_lang.eq_ignore_ascii_case("en")
}

/// Exact-match lookup on the trimmed text.
///
/// Only surrounding whitespace is removed; punctuation, case and
/// full/half-width forms must match the entry verbatim.
pub fn lookup(text: &str, source_lang: &str, target_lang: &str) -> Option<&'static str> {
    if !covers(source_lang, target_lang) {
        return None;
    }
    table().get(text.trim()).copied()
}
