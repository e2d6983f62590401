use tracing::debug;

use crate::normalize::{clean_challenge, extract_numbers};

/// Words that flip a two-number puzzle from addition to subtraction. Matched
/// as substrings of the cleaned text, so `slows` and `reduces` count.
const SUBTRACT_KEYWORDS: [&str; 5] = ["decrease", "lose", "reduce", "slow", "drop"];

/// Deterministic answer for simple puzzles.
///
/// One number is returned as-is; two numbers are subtracted when a
/// subtraction keyword appears and added otherwise. Anything else, including
/// numbers too large for `i64` arithmetic, is left to the model.
pub fn rule_based(challenge: &str) -> Option<f64> {
    let cleaned = clean_challenge(challenge);
    let numbers = extract_numbers(&cleaned);
    debug!(cleaned = %cleaned, ?numbers, "[RULE] parsed challenge");

    let value = match numbers?.as_slice() {
        [single] => *single,
        [a, b] if is_subtraction(&cleaned) => a.checked_sub(*b)?,
        [a, b] => a.checked_add(*b)?,
        _ => return None,
    };
    Some(value as f64)
}

fn is_subtraction(cleaned: &str) -> bool {
    SUBTRACT_KEYWORDS.iter().any(|kw| cleaned.contains(kw))
}
