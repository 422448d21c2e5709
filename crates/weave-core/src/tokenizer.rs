use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::constants::VOWELS;

static VOWEL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("[{VOWELS}]+")).unwrap());

/// Whitespace tokens, case preserved. No punctuation stripping.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Lowercased whitespace tokens.
pub fn lowercase_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Unique tokens / total tokens, 0 for an empty token list.
pub fn unique_ratio<S: AsRef<str>>(tokens: &[S]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    unique.len() as f64 / tokens.len() as f64
}

/// Syllable estimate: maximal vowel runs, at least 1.
pub fn estimate_syllables(word: &str) -> usize {
    VOWEL_RUN.find_iter(&word.to_lowercase()).count().max(1)
}

/// Comma-separated clauses. Always at least one (possibly empty) clause.
pub fn clauses(text: &str) -> Vec<&str> {
    text.split(',').collect()
}

/// Binary vowel(1)/consonant(0) signal over the alphabetic characters of `text`.
pub fn vowel_signal(text: &str) -> Vec<u8> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .map(|c| u8::from(VOWELS.contains(c)))
        .collect()
}

/// Character count (not bytes).
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
