//! Property tests for the palindrome, discount and predicate functions.

use mirror_commerce::palindrome::{check, is_palindrome, normalize};
use mirror_commerce::{build_search_predicate, calculate_discounted_price, SearchPredicate};
use proptest::prelude::*;

/// Latin text with accents, digits and punctuation.
const LATIN: &str = "[a-zA-Z0-9 ,.!?'áéíóúñÁÉÍÓÚÑ-]{0,40}";

/// Conjoining jamo, Hangul syllables, combining marks, circled letters
/// (category So), Greek and spaces mixed together.
const MIXED: &str =
    "[\u{1100}-\u{1112}\u{1161}-\u{1175}\u{11A8}-\u{11C2}\u{AC00}-\u{AC20}\u{0300}-\u{036F}\u{24B6}-\u{24E9}\u{0391}-\u{03C9}\u{0130}aAi ]{0,30}";

/// Any printable text, Latin-heavy or otherwise.
fn text() -> impl Strategy<Value = String> {
    prop_oneof![LATIN, MIXED, "\\PC{0,40}"]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Reversing the normalized form never changes the verdict.
    #[test]
    fn palindrome_verdict_is_symmetric(text in text()) {
        let reversed: String = normalize(&text).chars().rev().collect();
        prop_assert_eq!(is_palindrome(&text), is_palindrome(&reversed));
    }

    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_is_idempotent(text in text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Any word followed by its mirror image is a palindrome.
    #[test]
    fn mirrored_words_are_palindromes(word in "[a-z0-9ñé]{1,20}") {
        let mirrored: String = word.chars().chain(word.chars().rev()).collect();
        prop_assert!(is_palindrome(&mirrored));
        prop_assert!(is_palindrome(&mirrored.to_uppercase()));
    }

    /// The verdict only depends on the normalized form.
    #[test]
    fn verdict_matches_normalized_form(text in text()) {
        let verdict = check(&text);
        prop_assert_eq!(verdict.is_palindrome, is_palindrome(&verdict.normalized));
        prop_assert_eq!(check(&text), verdict);
    }

    /// final + amount == original, and the percentage is binary.
    #[test]
    fn discount_parts_sum_to_original(price in 0.0f64..100_000.0, term in text()) {
        let result = calculate_discounted_price(price, &term);
        let tolerance = 1e-9 * price.max(1.0);

        prop_assert!((result.final_price + result.discount_amount - price).abs() <= tolerance);
        prop_assert!(result.discount_percentage == 0 || result.discount_percentage == 50);
        prop_assert_eq!(result.is_palindrome, is_palindrome(&term));

        let expected = price * (1.0 - f64::from(result.discount_percentage) / 100.0);
        prop_assert!((result.final_price - expected).abs() <= tolerance);
    }

    /// Case and surrounding whitespace do not affect the predicate.
    #[test]
    fn predicate_ignores_case_and_padding(term in "[a-zA-Z0-9 ]{0,12}") {
        let predicate = build_search_predicate(&term);
        prop_assert_eq!(&build_search_predicate(&term.to_uppercase()), &predicate);
        prop_assert_eq!(&build_search_predicate(&format!(" \t{term}\n ")), &predicate);
    }

    /// The mode follows the trimmed length.
    #[test]
    fn predicate_mode_follows_length(term in "[a-z]{0,8}") {
        let predicate = build_search_predicate(&term);
        match term.len() {
            0 => prop_assert_eq!(predicate, SearchPredicate::All),
            1..=3 => prop_assert_eq!(predicate.mode(), "exact"),
            _ => prop_assert_eq!(predicate.substring(), Some(term.as_str())),
        }
    }
}
