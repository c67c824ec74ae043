//! Language detection: secondary-script characters win outright; otherwise curated keyword votes.

use companion_core::Language;

use crate::script::contains_secondary_script;

/// Frequent English function words and feeling verbs.
const ENGLISH_KEYWORDS: &[&str] = &[
    "the", "and", "i", "you", "is", "are", "am", "my", "me", "it", "to", "not", "have", "feel",
    "what", "this", "that", "with", "for", "was",
];

/// Romanised Chinese (pinyin) particles and common words, for text typed without ideographs.
const CHINESE_KEYWORDS: &[&str] = &[
    "wo", "ni", "ta", "de", "shi", "bu", "hao", "le", "ma", "ne", "ba", "xiexie", "meiyou",
    "zhende", "keyi", "zenme", "weishenme",
];

/// Detects the language of `text`, falling back to `default` on ties or no evidence.
pub fn detect_language(text: &str, default: Language) -> Language {
    if contains_secondary_script(text) {
        return Language::Chinese;
    }

    let mut english = 0usize;
    let mut chinese = 0usize;
    for word in text
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        if ENGLISH_KEYWORDS.contains(&word.as_str()) {
            english += 1;
        }
        if CHINESE_KEYWORDS.contains(&word.as_str()) {
            chinese += 1;
        }
    }

    match english.cmp(&chinese) {
        std::cmp::Ordering::Greater => Language::English,
        std::cmp::Ordering::Less => Language::Chinese,
        std::cmp::Ordering::Equal => default,
    }
}
