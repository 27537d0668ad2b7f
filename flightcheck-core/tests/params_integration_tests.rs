// flightcheck-core/tests/params_integration_tests.rs
use flightcheck_core::params::{compare_params, filter_params, get_or_compile_patterns, parse_params, ParameterMap};

const UPLOAD: &str = "\
# Onboard parameters for Quad_1
ATC_RAT_RLL_P=0.135
ATC_RAT_PIT_P,0.135
PID_ROLL 4.5
STAT_BOOTCNT = 12   // increments every boot
STAT_FLTTIME=5400
FS_BATT_VOLTAGE=14.0
malformed_line_without_delimiter
";

const RECORDED: &str = "\
ATC_RAT_RLL_P=0.15
ATC_RAT_PIT_P=0.135
PID_ROLL=3.0
STAT_BOOTCNT=9
STAT_FLTTIME=3000
FENCE_ENABLE=1
";

fn patterns(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

#[test_log::test]
fn test_diff_across_mixed_formats() {
    let diff = compare_params(UPLOAD, RECORDED, &patterns(&["STAT_*"]));

    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.added["FS_BATT_VOLTAGE"], "14.0");
    assert_eq!(diff.removed.len(), 1);
    assert_eq!(diff.removed["FENCE_ENABLE"], "1");
    assert_eq!(diff.changed.len(), 2);
    assert_eq!(diff.changed["ATC_RAT_RLL_P"], ("0.15".to_string(), "0.135".to_string()));
    assert_eq!(diff.changed["PID_ROLL"], ("3.0".to_string(), "4.5".to_string()));
}

#[test]
fn test_identical_texts_have_no_differences() {
    for text in [UPLOAD, RECORDED, "", "# only a comment\n"] {
        assert!(compare_params(text, text, &[]).is_empty());
    }
}

#[test]
fn test_differences_only_in_ignored_keys_are_hidden() {
    let current = "PID_ROLL=1\nPID_PITCH=2\nTHR=2";
    let reference = "PID_ROLL=9\nTHR=2";
    assert!(!compare_params(current, reference, &[]).is_empty());
    assert!(compare_params(current, reference, &patterns(&["PID_*"])).is_empty());
}

#[test]
fn test_empty_pattern_list_is_a_no_op() {
    let params = parse_params(UPLOAD);
    assert_eq!(filter_params(&params, &[]), params);
}

#[test]
fn test_regex_and_fallback_paths_agree() {
    let params: ParameterMap = ["PID_ROLL", "PID_PITCH", "THR_MIN", "THR_MAX", "Z9", "[A]"]
        .iter()
        .map(|k| (k.to_string(), "1".to_string()))
        .collect();

    // A reversed range can't be compiled into the union regex.
    let broken = patterns(&["PID_*", "THR_M?X", "[z-a]"]);
    assert!(!get_or_compile_patterns(&broken).uses_regex());

    let filtered = filter_params(&params, &broken);
    let expected = filter_params(&params, &patterns(&["PID_*", "THR_M?X"]));
    assert_eq!(filtered, expected);
    assert!(filtered.contains_key("THR_MIN"));
    assert!(filtered.contains_key("Z9"));
}

#[test]
fn test_character_classes() {
    let params = parse_params("SERVO1_MIN=1\nSERVO2_MIN=1\nSERVO9_MIN=1\nSERVOX_MIN=1");
    let filtered = filter_params(&params, &patterns(&["SERVO[1-3]_*", "SERVO[!0-9]_MIN"]));
    let mut keys: Vec<&String> = filtered.keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["SERVO9_MIN"]);
}
