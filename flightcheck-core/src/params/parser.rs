//! Tolerant line-oriented parser for vehicle parameter dumps.
//!
//! Parameter files come from several ground stations and firmware versions, so the
//! parser accepts `KEY=VALUE`, `KEY,VALUE` and `KEY VALUE` lines side by side and
//! silently drops anything it cannot split. A malformed line only ever means a
//! missing key, never a failed parse.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;

use log::debug;

/// A parameter snapshot: key to raw string value.
pub type ParameterMap = HashMap<String, String>;

const HASH_COMMENT: char = '#';
const SLASH_COMMENT: &str = "//";

/// Parses parameter text into a [`ParameterMap`].
///
/// Each line is truncated at the first `#` and at the first `//`, trimmed, and split
/// on the first `=`, else the first `,`, else the first run of whitespace. Lines with
/// no delimiter or an empty key are skipped. Later duplicates overwrite earlier ones.
///
/// ```
/// use flightcheck_core::params::parse_params;
///
/// let params = parse_params("THR_MIN=100 # idle\n// full line comment\nRATE_P,0.15");
/// assert_eq!(params.len(), 2);
/// assert_eq!(params["THR_MIN"], "100");
/// assert_eq!(params["RATE_P"], "0.15");
/// ```
pub fn parse_params(content: &str) -> ParameterMap {
    let mut params = ParameterMap::new();
    let mut skipped = 0usize;

    for raw_line in content.lines() {
        let line = strip_comments(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        match split_line(line) {
            Some((key, value)) => {
                params.insert(key.to_string(), value.to_string());
            }
            None => skipped += 1,
        }
    }

    debug!(
        "Parsed {} parameter(s), skipped {} malformed line(s).",
        params.len(),
        skipped
    );
    params
}

fn strip_comments(line: &str) -> &str {
    let line = match line.find(HASH_COMMENT) {
        Some(idx) => &line[..idx],
        None => line,
    };
    match line.find(SLASH_COMMENT) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Splits a trimmed, comment-free line into a `(key, value)` pair.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = if let Some(pair) = line.split_once('=') {
        pair
    } else if let Some(pair) = line.split_once(',') {
        pair
    } else {
        line.split_once(char::is_whitespace)?
    };

    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
