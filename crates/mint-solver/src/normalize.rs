//! Puzzle text cleanup and number extraction.
//!
//! Challenges arrive obfuscated: random capitalisation, symbols sprinkled
//! between letters, doubled letters (`seevveen`) and hyphenated words
//! (`thirty-five`). Cleaning squeezes every run of a repeated letter, so the
//! number-word tables below are compared in squeezed form too (`three` is
//! stored as `thre`).

use std::sync::LazyLock;

use regex::Regex;

static HYPHEN_BETWEEN_LETTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z])\s*-\s*([A-Za-z])").expect("hyphen regex is valid")
});

const UNITS: [(&str, i64); 20] = [
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: [(&str, i64); 8] = [
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

/// Normalise puzzle text: join hyphen-split words, replace everything but
/// ASCII letters and digits with spaces, lowercase, collapse whitespace and
/// squeeze repeated letters in every token.
pub fn clean_challenge(challenge: &str) -> String {
    let mut joined = challenge.to_string();
    loop {
        let next = HYPHEN_BETWEEN_LETTERS
            .replace_all(&joined, "$1$2")
            .into_owned();
        if next == joined {
            break;
        }
        joined = next;
    }

    let spaced: String = joined
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();

    spaced
        .split_whitespace()
        .map(squeeze_letters)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse runs of the same letter (`seevveen` -> `seven`). Digits are left
/// alone so `100` stays `100`.
pub fn squeeze_letters(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut prev: Option<char> = None;
    for c in token.chars() {
        if c.is_ascii_alphabetic() && prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Integers in a cleaned challenge, in the order they appear.
///
/// Digit runs parse directly. A tens word followed by a unit word
/// (`thirty five`) or glued to one (`thirtyfive`) forms one number.
/// Returns `None` when a digit run does not fit in an `i64`.
pub fn extract_numbers(cleaned: &str) -> Option<Vec<i64>> {
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let mut numbers = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        i += 1;

        if token.chars().any(|c| c.is_ascii_digit()) {
            for run in token.split(|c: char| !c.is_ascii_digit()) {
                if !run.is_empty() {
                    numbers.push(run.parse().ok()?);
                }
            }
            continue;
        }

        if let Some(tens) = lookup(&TENS, token) {
            match tokens.get(i).and_then(|next| unit_digit(next)) {
                Some(unit) => {
                    numbers.push(tens + unit);
                    i += 1;
                }
                None => numbers.push(tens),
            }
            continue;
        }

        if let Some(value) = lookup(&UNITS, token).or_else(|| glued_compound(token)) {
            numbers.push(value);
        }
    }
    Some(numbers)
}

fn lookup(table: &[(&str, i64)], token: &str) -> Option<i64> {
    table
        .iter()
        .find(|(word, _)| squeeze_letters(word) == token)
        .map(|(_, value)| *value)
}

fn unit_digit(token: &str) -> Option<i64> {
    lookup(&UNITS, token).filter(|value| (1..=9).contains(value))
}

/// `thirtyfive` -> 35.
fn glued_compound(token: &str) -> Option<i64> {
    TENS.iter().find_map(|(word, tens)| {
        let rest = token.strip_prefix(squeeze_letters(word).as_str())?;
        unit_digit(rest).map(|unit| tens + unit)
    })
}
