/*!
 * Word utilities for Russian vocabulary handling.
 *
 * Decides which words are worth translating, normalizes them into cache
 * keys and splits plain text into candidate words.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Matches a Russian word: Cyrillic letters and stress marks, optionally joined by hyphens
static RUSSIAN_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Cyrillic}\x{0300}\x{0301}]+(?:-[\p{Cyrillic}\x{0300}\x{0301}]+)*")
        .expect("static word pattern is valid")
});

/// Check whether a character belongs to the Cyrillic block (U+0400..U+04FF)
pub fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

/// Check if a word is worth translating: it must contain at least one Cyrillic letter
pub fn is_russian_word(word: &str) -> bool {
    word.chars().any(is_cyrillic)
}

/// Normalize a word into its lookup form (trimmed and lowercased)
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Split plain text into the set of distinct lowercase Russian words it contains
pub fn extract_words(text: &str) -> BTreeSet<String> {
    RUSSIAN_WORD
        .find_iter(text)
        .map(|m| normalize_word(m.as_str()))
        .filter(|w| is_russian_word(w))
        .collect()
}
