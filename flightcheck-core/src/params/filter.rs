//! filter.rs - Ignore-pattern filtering of parameter maps.
//!
//! Ignore patterns are shell globs (`*`, `?`, `[...]`, `[!...]`). A pattern list is
//! translated into a single anchored alternation regex and compiled once, then cached
//! process-wide keyed by the hash of the list. If the regex cannot be built, matching
//! falls back to a direct glob matcher, so filtering never fails.
//!
//! License: MIT OR APACHE 2.0

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use crate::errors::FlightcheckError;
use crate::params::parser::ParameterMap;

/// Upper bound for the compiled union regex.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A compiled set of ignore patterns.
#[derive(Debug)]
pub struct CompiledPatterns {
    patterns: Vec<String>,
    union: Option<Regex>,
}

impl CompiledPatterns {
    /// Compiles `patterns`, falling back to direct glob matching if the union regex
    /// cannot be built.
    pub fn new(patterns: &[String]) -> Self {
        let union = match compile_union(patterns) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(
                    target: "flightcheck_core::filter",
                    "{}. Falling back to direct glob matching.",
                    e
                );
                None
            }
        };
        Self {
            patterns: patterns.to_vec(),
            union,
        }
    }

    /// Returns true when `key` fully matches any of the patterns.
    pub fn is_ignored(&self, key: &str) -> bool {
        match &self.union {
            Some(regex) => regex.is_match(key),
            None => self.patterns.iter().any(|p| glob_match(p, key)),
        }
    }

    /// True if matching goes through the compiled union regex.
    pub fn uses_regex(&self) -> bool {
        self.union.is_some()
    }
}

lazy_static! {
    static ref COMPILED_PATTERNS_CACHE: RwLock<HashMap<u64, Arc<CompiledPatterns>>> =
        RwLock::new(HashMap::new());
}

fn hash_patterns(patterns: &[String]) -> u64 {
    let mut hasher = DefaultHasher::new();
    patterns.hash(&mut hasher);
    hasher.finish()
}

/// Gets a compiled pattern set from the cache, or compiles and caches it.
///
/// A poisoned cache lock is not fatal: the set is compiled without caching.
pub fn get_or_compile_patterns(patterns: &[String]) -> Arc<CompiledPatterns> {
    let cache_key = hash_patterns(patterns);

    if let Ok(cache) = COMPILED_PATTERNS_CACHE.read() {
        if let Some(compiled) = cache.get(&cache_key) {
            if compiled.patterns == patterns {
                debug!("Serving compiled ignore patterns from cache for key: {}", cache_key);
                return Arc::clone(compiled);
            }
        }
    }

    let compiled = Arc::new(CompiledPatterns::new(patterns));
    match COMPILED_PATTERNS_CACHE.write() {
        Ok(mut cache) => {
            cache.insert(cache_key, Arc::clone(&compiled));
        }
        Err(_) => warn!("Ignore pattern cache lock is poisoned; skipping cache insert."),
    }
    compiled
}

/// Returns the entries of `params` whose keys match none of `patterns`.
///
/// An empty pattern list returns every entry unchanged.
///
/// ```
/// use flightcheck_core::params::{filter_params, parse_params};
///
/// let params = parse_params("PID_ROLL=1\nTHR=2");
/// let filtered = filter_params(&params, &["PID_*".to_string()]);
/// assert!(!filtered.contains_key("PID_ROLL"));
/// assert_eq!(filtered["THR"], "2");
/// ```
pub fn filter_params(params: &ParameterMap, patterns: &[String]) -> ParameterMap {
    if patterns.is_empty() {
        return params.clone();
    }

    let compiled = get_or_compile_patterns(patterns);
    let filtered: ParameterMap = params
        .iter()
        .filter(|(key, _)| !compiled.is_ignored(key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    debug!(
        target: "flightcheck_core::filter",
        "Ignore patterns removed {} of {} parameter(s).",
        params.len() - filtered.len(),
        params.len()
    );
    filtered
}

/// Builds the anchored union regex for a pattern list.
pub fn compile_union(patterns: &[String]) -> Result<Regex, FlightcheckError> {
    let alternation = patterns
        .iter()
        .map(|p| glob_to_regex(p))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&format!("^(?:{})$", alternation))
        .dot_matches_new_line(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| FlightcheckError::PatternCompilationError(patterns.len(), e))
}

/// Translates one shell glob into an unanchored regex fragment.
///
/// An unterminated `[` is treated as a literal bracket.
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push_str(".*");
                i += 1;
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&class_to_regex(&chars[i + 1..end]));
                    i = end + 1;
                }
                None => {
                    out.push_str("\\[");
                    i += 1;
                }
            },
            c => {
                out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4])));
                i += 1;
            }
        }
    }
    out
}

/// Finds the index of the `]` closing the class opened at `open`.
///
/// A `]` directly after `[` or `[!` is a literal member, not the terminator.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}

fn class_to_regex(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut members = body;
    if let Some(('!', rest)) = body.split_first() {
        out.push('^');
        members = rest;
    }
    for (idx, &c) in members.iter().enumerate() {
        let is_range_dash = c == '-' && idx > 0 && idx + 1 < members.len();
        if is_range_dash {
            out.push('-');
        } else if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~' | '-') {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out.push(']');
    out
}

/// Matches `text` against a shell glob without regular expressions.
///
/// This is the fallback path used when the union regex cannot be compiled, so it must
/// accept any pattern: a reversed class range such as `[z-a]` simply matches nothing.
///
/// ```
/// use flightcheck_core::params::glob_match;
///
/// assert!(glob_match("PID_*", "PID_ROLL"));
/// assert!(glob_match("SERVO?_FUNCTION", "SERVO3_FUNCTION"));
/// assert!(!glob_match("SERVO[!0-4]_MIN", "SERVO3_MIN"));
/// ```
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    // Position of the last '*' seen and the text index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < txt.len() {
        if p < pat.len() {
            match pat[p] {
                '*' => {
                    backtrack = Some((p, t));
                    p += 1;
                    continue;
                }
                '?' => {
                    p += 1;
                    t += 1;
                    continue;
                }
                '[' => {
                    if let Some(end) = class_end(&pat, p) {
                        if class_matches(&pat[p + 1..end], txt[t]) {
                            p = end + 1;
                            t += 1;
                            continue;
                        }
                    } else if txt[t] == '[' {
                        p += 1;
                        t += 1;
                        continue;
                    }
                }
                c if c == txt[t] => {
                    p += 1;
                    t += 1;
                    continue;
                }
                _ => {}
            }
        }

        match backtrack {
            Some((star_p, star_t)) => {
                p = star_p + 1;
                t = star_t + 1;
                backtrack = Some((star_p, star_t + 1));
            }
            None => return false,
        }
    }

    pat[p..].iter().all(|&c| c == '*')
}

fn class_matches(body: &[char], c: char) -> bool {
    let (negated, members) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut found = false;
    let mut i = 0;
    while i < members.len() {
        if i + 2 < members.len() && members[i + 1] == '-' {
            let (lo, hi) = (members[i], members[i + 2]);
            if lo <= c && c <= hi {
                found = true;
            }
            i += 3;
        } else {
            if members[i] == c {
                found = true;
            }
            i += 1;
        }
    }
    found != negated
}
