//! Substring heuristics that turn an HTTP response into a verdict.
//!
//! Everything here is pure: the rule sets are plain data and the functions
//! never touch the network.

pub mod execution;
pub mod rules;
pub mod upload;

pub use execution::{classify_execution, matched_execution_indicator};
pub use rules::{ExecutionRules, IndicatorRules, IndicatorSet, UploadRules};
pub use upload::classify_upload;

/// True when the lower-cased haystack contains any non-empty needle.
pub(crate) fn contains_any(haystack_lower: &str, needles: &[String]) -> bool {
    find_any(haystack_lower, needles).is_some()
}

pub(crate) fn find_any<'a>(haystack_lower: &str, needles: &'a [String]) -> Option<&'a str> {
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .find(|n| haystack_lower.contains(&n.to_lowercase()))
        .map(|n| n.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_any_ignores_empty_needles() {
        let needles = vec![String::new()];
        assert!(!contains_any("anything", &needles));
    }

    #[test]
    fn test_contains_any_case_insensitive_needles() {
        let needles = vec!["PHP Version".to_string()];
        assert!(contains_any("<p>php version: 8.2</p>", &needles));
    }
}
