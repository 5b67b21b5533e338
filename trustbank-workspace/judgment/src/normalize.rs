//! Text normalization shared by rule loading and classification.
//!
//! Keywords and input pass through the same function. Whitespace is kept
//! exactly as written: phrase keywords such as "made up" only match a single
//! literal space.

/// Lowercase (Unicode-aware) and drop control and zero-width characters.
pub fn for_rules(s: &str) -> String {
    s.chars()
        .filter(|ch| !ch.is_control())
        .flat_map(char::to_lowercase)
        .filter(|lc| !matches!(lc, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'))
        .collect()
}
