//! Text normalization shared by the extractor and the name matcher.

/// Maps an accented Latin letter to its base letter.
///
/// Only lowercase input is expected; callers lowercase first.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn lower_folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_lowercase).map(fold_diacritic)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes a person name for comparison.
///
/// Lowercases, strips diacritics, drops every character that is neither
/// alphanumeric nor whitespace, and collapses runs of whitespace.
///
/// # Example
///
/// ```
/// use roster_import::matching::normalize_name;
///
/// assert_eq!(normalize_name("  Ana  Pérez-Gómez. "), "ana perezgomez");
/// assert_eq!(normalize_name("MUÑOZ"), "munoz");
/// ```
pub fn normalize_name(name: &str) -> String {
    let kept: String = lower_folded(name)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    collapse_whitespace(&kept)
}

/// Normalizes header and marker text for substring matching.
///
/// Upper-cases, strips diacritics and turns punctuation into spaces, so
/// `"Serv. sin conductor:"` becomes `"SERV SIN CONDUCTOR"`.
pub fn normalize_label(text: &str) -> String {
    let spaced: String = lower_folded(text)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&spaced).to_uppercase()
}

/// Cleans a roster name for display: trimmed, single-spaced, case kept.
pub fn display_name(name: &str) -> String {
    collapse_whitespace(name)
}
