//! Character-range checks for the secondary script (CJK ideographs and punctuation).

/// Returns true if `c` belongs to the secondary script.
pub fn is_secondary_script_char(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF     // CJK Unified Ideographs
            | 0x3400..=0x4DBF // Extension A
            | 0xF900..=0xFAFF // Compatibility Ideographs
            | 0x3000..=0x303F // CJK punctuation
            | 0xFF00..=0xFFEF // Full-width forms
    )
}

/// Returns true if any character of `text` belongs to the secondary script.
pub fn contains_secondary_script(text: &str) -> bool {
    text.chars().any(is_secondary_script_char)
}
