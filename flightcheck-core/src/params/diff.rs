//! diff.rs - Added/removed/changed classification between two parameter snapshots.
//!
//! License: MIT OR APACHE 2.0

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::params::filter::filter_params;
use crate::params::parser::{parse_params, ParameterMap};

/// A changed parameter: `(reference_value, current_value)`, i.e. old then new.
pub type ValueChange = (String, String);

/// The outcome of comparing a current parameter set against a reference.
///
/// Values are compared as exact strings, so `"1.0"` and `"1"` differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Present in current, absent from reference.
    pub added: BTreeMap<String, String>,
    /// Present in reference, absent from current.
    pub removed: BTreeMap<String, String>,
    /// Present in both with different values.
    pub changed: BTreeMap<String, ValueChange>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of differing keys.
    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Parses, filters and diffs two parameter texts.
///
/// Both sides are filtered with the same `ignore_patterns` before comparison.
///
/// ```
/// use flightcheck_core::params::compare_params;
///
/// let diff = compare_params("A=1\nB=2", "B=3\nC=4", &[]);
/// assert_eq!(diff.added["A"], "1");
/// assert_eq!(diff.removed["C"], "4");
/// assert_eq!(diff.changed["B"], ("3".to_string(), "2".to_string()));
/// ```
pub fn compare_params(
    current_content: &str,
    reference_content: &str,
    ignore_patterns: &[String],
) -> DiffResult {
    let current = filter_params(&parse_params(current_content), ignore_patterns);
    let reference = filter_params(&parse_params(reference_content), ignore_patterns);
    diff_maps(&current, &reference)
}

/// Diffs two already-parsed (and already-filtered) parameter maps.
pub fn diff_maps(current: &ParameterMap, reference: &ParameterMap) -> DiffResult {
    let mut result = DiffResult::default();

    for (key, value) in current {
        match reference.get(key) {
            None => {
                result.added.insert(key.clone(), value.clone());
            }
            Some(old) if old != value => {
                result
                    .changed
                    .insert(key.clone(), (old.clone(), value.clone()));
            }
            Some(_) => {}
        }
    }

    for (key, value) in reference {
        if !current.contains_key(key) {
            result.removed.insert(key.clone(), value.clone());
        }
    }

    debug!(
        "Parameter diff: {} added, {} removed, {} changed.",
        result.added.len(),
        result.removed.len(),
        result.changed.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_classification() {
        let diff = compare_params("A=1\nB=2", "B=3\nC=4", &[]);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added["A"], "1");
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed["C"], "4");
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed["B"], ("3".to_string(), "2".to_string()));
        assert_eq!(diff.total(), 3);
    }

    #[test]
    fn test_identical_text_is_empty() {
        let text = "A=1\nB,2\n# note\nC 3\nA=4";
        assert!(compare_params(text, text, &[]).is_empty());
    }

    #[test]
    fn test_no_numeric_normalisation() {
        let diff = compare_params("RATE=1.0", "RATE=1", &[]);
        assert_eq!(
            diff.changed["RATE"],
            ("1".to_string(), "1.0".to_string())
        );
    }

    #[test]
    fn test_ignored_keys_do_not_show_up() {
        let current = "PID_ROLL=1\nPID_YAW=5\nTHR=2";
        let reference = "PID_ROLL=9\nPID_PITCH=3\nTHR=2";
        let diff = compare_params(current, reference, &["PID_*".to_string()]);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_format_differences_do_not_count() {
        let diff = compare_params("A=1\nB=2", "A,1\nB 2", &[]);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_result_iterates_sorted() {
        let diff = compare_params("Z=1\nM=1\nA=1", "", &[]);
        let keys: Vec<&str> = diff.added.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "M", "Z"]);
    }
}
