use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonical form of a role label used for every comparison.
///
/// Decomposes, drops diacritics and control characters, lowercases, trims and
/// collapses inner whitespace: `"  PROFESOR/A "` and `"Profesór/a"` both map to
/// `"profesor/a"`.
pub fn normalize_role_name(label: &str) -> String {
    let stripped: String = label
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !c.is_control())
        .collect::<String>()
        .to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
