//! Palindrome detection for search terms.
//!
//! A term is normalized before comparison: the text is canonically composed
//! (NFC), everything outside the Unicode letter (`L`) and number (`N`)
//! categories is dropped, the remainder is lowercased and composed again.
//! Accented letters and non-Latin scripts survive normalization, so `"é"` and
//! `"e"` are different characters here.
//!
//! Conjoining Hangul jamo left over after recomposition are dropped. They are
//! syllable fragments, and keeping them would let reversal compose them into
//! different syllables.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Runs of characters outside the letter and number categories.
static NOT_LETTER_OR_DIGIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}]+").expect("letter/digit class is a valid pattern")
});

/// Shortest normalized length that can count as a palindrome.
pub const MIN_PALINDROME_LEN: usize = 2;

/// Outcome of a palindrome check, with the normalized form it was based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalindromeVerdict {
    pub is_palindrome: bool,
    pub normalized: String,
}

/// Reduce text to lowercase letters and digits.
///
/// The result is in NFC and normalizing it again returns it unchanged.
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let lowered: String = NOT_LETTER_OR_DIGIT
        .replace_all(&composed, "")
        .chars()
        .flat_map(char::to_lowercase)
        .collect();

    // Some uppercase letters lowercase into a base letter plus a mark
    // (U+0130 becomes "i\u{307}").
    NOT_LETTER_OR_DIGIT
        .replace_all(&lowered, "")
        .nfc()
        .filter(|&c| !is_conjoining_jamo(c))
        .collect()
}

/// Check a term and keep the normalized form.
pub fn check(text: &str) -> PalindromeVerdict {
    let normalized = normalize(text);
    let chars: Vec<char> = normalized.chars().collect();

    let is_palindrome =
        chars.len() >= MIN_PALINDROME_LEN && chars.iter().eq(chars.iter().rev());

    PalindromeVerdict {
        is_palindrome,
        normalized,
    }
}

/// Whether `text` reads the same forward and backward after normalization.
///
/// Single characters and empty input are never palindromes.
///
/// ```
/// use mirror_commerce::palindrome::is_palindrome;
///
/// assert!(is_palindrome("A man, a plan, a canal: Panama"));
/// assert!(!is_palindrome("a"));
/// ```
pub fn is_palindrome(text: &str) -> bool {
    check(text).is_palindrome
}

/// Untyped entry point. Only JSON strings can be palindromes; numbers,
/// arrays, objects, booleans and null are all `false`.
pub fn is_palindrome_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::String(text) => is_palindrome(text),
        _ => false,
    }
}

fn is_conjoining_jamo(c: char) -> bool {
    matches!(c, '\u{1100}'..='\u{11FF}' | '\u{A960}'..='\u{A97F}' | '\u{D7B0}'..='\u{D7FF}')
}
