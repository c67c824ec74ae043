//! Unit tests for token estimation.

use super::*;

#[test]
fn test_estimate_tokens_primary_script() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("a"), 1);
    assert_eq!(estimate_tokens("Hello"), 2);
    assert_eq!(estimate_tokens("Hello world"), 3);
}

#[test]
fn test_secondary_script_is_denser() {
    // 6 ideographs / 1.5 = 4 tokens; 6 latin chars / 4 = 2 tokens.
    assert_eq!(estimate_tokens("我今天很难过"), 4);
    assert_eq!(estimate_tokens("abcdef"), 2);
}

#[test]
fn test_mixed_text_sums_per_script() {
    // 3 ideographs -> 2.0, 4 latin -> 1.0
    assert_eq!(estimate_tokens("你好吗okay"), 3);
}

#[test]
fn test_monotonic_in_length_for_fixed_script() {
    let estimator = TokenEstimator::default();
    let mut previous = 0;
    for n in 0..200 {
        let text = "x".repeat(n);
        let current = estimator.estimate(&text);
        assert!(current >= previous, "length {} decreased estimate", n);
        previous = current;
    }
    let mut previous = 0;
    for n in 0..100 {
        let text = "字".repeat(n);
        let current = estimator.estimate(&text);
        assert!(current >= previous);
        previous = current;
    }
}

#[test]
fn test_custom_ratios() {
    let estimator = TokenEstimator {
        primary_chars_per_token: 1.0,
        secondary_chars_per_token: 1.0,
    };
    assert_eq!(estimator.estimate("abc字"), 4);
}
