// flightcheck-core/src/lib.rs
//! # Flightcheck Core Library
//!
//! `flightcheck-core` holds the decision logic of a ground-station flight log manager:
//! comparing autopilot parameter snapshots, validating preflight checklist answers, and
//! keeping the log capture directory within its quotas. It has no UI and owns no storage;
//! callers hand it text, answers and a directory, and get plain results back.
//!
//! ## Modules
//!
//! * `params`: Parameter text parsing, ignore-pattern filtering and snapshot diffs.
//! * `rules`: The checklist rule language and its sandboxed evaluator.
//! * `checklist`: Checklist items and log entry validation.
//! * `retention`: Age and size based pruning of the capture directory.
//! * `config`: The settings snapshot the engine consumes, with defaults and merging.
//! * `errors`: Error types for the fallible edges (settings, pattern compilation).
//!
//! ## Usage Example
//!
//! ```rust
//! use flightcheck_core::{compare_params, validate_rule, CheckValue};
//!
//! let current = "ATC_RAT_RLL_P = 0.15\nSTAT_FLTTIME = 1200\n";
//! let reference = "ATC_RAT_RLL_P = 0.135\nSTAT_FLTTIME = 900\n";
//! let diff = compare_params(current, reference, &["STAT_*".to_string()]);
//! assert_eq!(diff.changed["ATC_RAT_RLL_P"], ("0.135".to_string(), "0.15".to_string()));
//! assert_eq!(diff.total(), 1);
//!
//! assert!(validate_rule(&CheckValue::from(true), Some("checked")).is_ok());
//! ```
//!
//! ## Error Handling
//!
//! The engine operations never fail outward. Malformed parameter lines are skipped, a
//! pattern set that can't be compiled falls back to direct glob matching, rule problems
//! come back as a [`RuleViolation`], and retention logs and skips files it can't touch.
//! Settings loading uses `anyhow::Result` around the typed [`FlightcheckError`].
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod checklist;
pub mod config;
pub mod errors;
pub mod params;
pub mod retention;
pub mod rules;

pub use checklist::{validate_log_entry, ChecklistItem, ItemType, LogEntryDraft};
pub use config::{merge_settings, ChecklistItemConfig, EngineSettings, RetentionSettings, MAX_PATTERN_LENGTH};
pub use errors::FlightcheckError;
pub use params::{
    compare_params, diff_maps, filter_params, get_or_compile_patterns, glob_match, parse_params,
    CompiledPatterns, DiffResult, ParameterMap, ValueChange,
};
pub use retention::{
    enforce_retention, DryRunRemover, FileRemover, FsRemover, RetentionManager, RetentionPolicy,
    RetentionReport,
};
pub use rules::{
    check_rule_syntax, validate_checklist_rule, validate_rule, CheckValue, ExprError, RuleViolation,
};
