//! errors.rs - Custom error types for the flightcheck-core library.
//!
//! The engine itself never fails outward: parsing and filtering degrade silently,
//! rule evaluation reports a [`crate::rules::RuleViolation`], and retention logs and
//! skips. The variants here cover the fallible edges around it, such as loading
//! settings and compiling pattern sets for callers that want the error.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `flightcheck-core` library.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FlightcheckError {
    #[error("Failed to compile ignore pattern set ({0} pattern(s)): {1}")]
    PatternCompilationError(usize, regex::Error),

    #[error("Ignore pattern '{0}': length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Failed to read settings file {0}: {1}")]
    SettingsIo(String, #[source] std::io::Error),

    #[error("Failed to parse settings file {0}: {1}")]
    SettingsParse(String, String),

    #[error("Settings validation failed:\n{0}")]
    InvalidSettings(String),
}
