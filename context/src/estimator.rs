//! Token cost estimation.
//!
//! No tokenizer is involved: characters are divided by an average chars-per-token ratio.
//! Secondary-script characters tokenize more finely, so they use a denser ratio.

use classifier::is_secondary_script_char;
use serde::{Deserialize, Serialize};

/// Approximate characters per token for primary-script (Latin) text.
pub const PRIMARY_CHARS_PER_TOKEN: f64 = 4.0;
/// Approximate characters per token for secondary-script (CJK) text.
pub const SECONDARY_CHARS_PER_TOKEN: f64 = 1.5;

/// Per-script chars-per-token estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenEstimator {
    pub primary_chars_per_token: f64,
    pub secondary_chars_per_token: f64,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self {
            primary_chars_per_token: PRIMARY_CHARS_PER_TOKEN,
            secondary_chars_per_token: SECONDARY_CHARS_PER_TOKEN,
        }
    }
}

impl TokenEstimator {
    /// Estimates the cost of `text` in tokens.
    ///
    /// # Algorithm
    ///
    /// tokens = ceil(secondary / secondary_chars_per_token + primary / primary_chars_per_token)
    ///
    /// Where:
    /// - secondary = count of CJK characters
    /// - primary = count of every other character, whitespace and punctuation included
    ///
    /// Mixed text is charged per character class, then rounded up once.
    ///
    /// # Special Cases
    ///
    /// - Empty text costs 0
    /// - Any non-empty text costs at least 1
    ///
    /// # Examples
    ///
    /// ```
    /// use context::TokenEstimator;
    ///
    /// let estimator = TokenEstimator::default();
    /// assert_eq!(estimator.estimate(""), 0);
    /// assert_eq!(estimator.estimate("hi"), 1);
    /// assert_eq!(estimator.estimate("hello world!"), 3);
    /// assert_eq!(estimator.estimate("你好吗"), 2);
    /// ```
    pub fn estimate(&self, text: &str) -> usize {
        let (secondary, primary) = text.chars().fold((0usize, 0usize), |(s, p), c| {
            if is_secondary_script_char(c) {
                (s + 1, p)
            } else {
                (s, p + 1)
            }
        });
        if secondary == 0 && primary == 0 {
            return 0;
        }
        let tokens = secondary as f64 / self.secondary_chars_per_token
            + primary as f64 / self.primary_chars_per_token;
        (tokens.ceil() as usize).max(1)
    }
}

/// Estimates tokens with the default ratios.
pub fn estimate_tokens(text: &str) -> usize {
    TokenEstimator::default().estimate(text)
}
