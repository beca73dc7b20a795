//! Name similarity scoring.
//!
//! Scores how plausibly a free-text roster name refers to a registered worker
//! name. The score blends token agreement, raw character overlap and a bonus
//! for name-shaped agreement (same first name, matching surnames). It is
//! deliberately lenient: it ranks candidates for an operator to confirm and is
//! never a basis for accepting a match on its own.

use std::collections::HashSet;

use super::normalize::normalize_name;

/// Score for names that normalize to the same string.
pub const EXACT_MATCH_SCORE: f64 = 1.0;

/// Score when one normalized name contains the other in full.
pub const CONTAINMENT_SCORE: f64 = 0.9;

/// Tokens shorter than this are ignored.
const MIN_TOKEN_LENGTH: usize = 2;

/// Credit for containment between tokens of length >= 4.
const LONG_TOKEN_CONTAINMENT_CREDIT: f64 = 0.8;

/// Credit for containment between tokens of length 3.
const SHORT_TOKEN_CONTAINMENT_CREDIT: f64 = 0.7;

/// Character overlap below this earns no token credit.
const CHAR_OVERLAP_FLOOR: f64 = 0.6;

/// Scale applied to a qualifying character overlap.
const CHAR_OVERLAP_WEIGHT: f64 = 0.6;

/// Added to word similarity for short names with an exact token match.
const SHORT_NAME_BONUS: f64 = 0.2;

const WORD_WEIGHT: f64 = 0.8;
const CHAR_WEIGHT: f64 = 0.2;

const FIRST_NAME_BONUS: f64 = 0.3;
const SURNAME_BONUS: f64 = 0.2;
const PATTERN_BONUS_CAP: f64 = 0.4;

/// Scores the similarity of a roster name to a registered worker name.
///
/// Deterministic and pure. The result is in `[0, 1]`, rounded to two decimals.
/// Names that normalize to nothing score `0`.
///
/// # Example
///
/// ```
/// use roster_import::matching::score;
///
/// assert_eq!(score("Ana Perez", "ana pérez"), 1.0);
/// assert_eq!(score("Ana Perez", "Ana Pérez Gómez"), 0.9);
/// assert!(score("Ana Perez", "Carlos Ruiz") < 0.3);
/// ```
pub fn score(free_text_name: &str, canonical_name: &str) -> f64 {
    let left = normalize_name(free_text_name);
    let right = normalize_name(canonical_name);

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left == right {
        return EXACT_MATCH_SCORE;
    }
    if left.contains(right.as_str()) || right.contains(left.as_str()) {
        return CONTAINMENT_SCORE;
    }

    let left_tokens = tokenize(&left);
    let right_tokens = tokenize(&right);

    let word = word_similarity(&left_tokens, &right_tokens);
    let chars = char_similarity(&left, &right);
    let bonus = pattern_bonus(&left_tokens, &right_tokens).min(PATTERN_BONUS_CAP);

    round_to_hundredths((word * WORD_WEIGHT + chars * CHAR_WEIGHT + bonus).clamp(0.0, 1.0))
}

fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|token| char_len(token) >= MIN_TOKEN_LENGTH)
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn distinct_chars(text: &str) -> HashSet<char> {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Shared distinct characters over the longer length.
fn char_overlap(left: &str, right: &str) -> f64 {
    let longer = char_len(left).max(char_len(right));
    if longer == 0 {
        return 0.0;
    }
    let shared = distinct_chars(left)
        .intersection(&distinct_chars(right))
        .count();
    shared as f64 / longer as f64
}

fn contains_either(left: &str, right: &str) -> bool {
    left.contains(right) || right.contains(left)
}

/// Credit a token earns against one other token; `1.0` only when identical.
fn token_credit(left: &str, right: &str) -> f64 {
    if left == right {
        return 1.0;
    }

    let (left_len, right_len) = (char_len(left), char_len(right));
    if left_len >= 4 && right_len >= 4 {
        if contains_either(left, right) {
            return LONG_TOKEN_CONTAINMENT_CREDIT;
        }
        let overlap = char_overlap(left, right);
        if overlap >= CHAR_OVERLAP_FLOOR {
            return overlap * CHAR_OVERLAP_WEIGHT;
        }
        return 0.0;
    }
    if left_len >= 3 && right_len >= 3 && contains_either(left, right) {
        return SHORT_TOKEN_CONTAINMENT_CREDIT;
    }
    0.0
}

fn word_similarity(left: &[&str], right: &[&str]) -> f64 {
    let longest = left.len().max(right.len());
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let mut exact_matches = 0usize;
    let mut partial_credit = 0.0;
    for token in left {
        let best = right
            .iter()
            .map(|other| token_credit(token, other))
            .fold(0.0, f64::max);
        if best >= 1.0 {
            exact_matches += 1;
        } else {
            partial_credit += best;
        }
    }

    let mut similarity = (exact_matches as f64 + partial_credit) / longest as f64;
    if (left.len() <= 2 || right.len() <= 2) && exact_matches > 0 {
        similarity = (similarity + SHORT_NAME_BONUS).min(1.0);
    }
    similarity
}

fn char_similarity(left: &str, right: &str) -> f64 {
    char_overlap(left, right)
}

fn is_near_match(left: &str, right: &str) -> bool {
    left == right || (char_len(left) >= 3 && char_len(right) >= 3 && contains_either(left, right))
}

fn pattern_bonus(left: &[&str], right: &[&str]) -> f64 {
    let (Some(left_first), Some(right_first)) = (left.first(), right.first()) else {
        return 0.0;
    };

    let mut bonus = 0.0;
    if left_first == right_first {
        bonus += FIRST_NAME_BONUS;
    }
    for surname in left.iter().skip(1) {
        if right.iter().skip(1).any(|other| is_near_match(surname, other)) {
            bonus += SURNAME_BONUS;
        }
    }
    bonus
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
