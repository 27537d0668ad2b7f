//! Sandboxed validation rules for preflight checklist answers.
//!
//! A rule string is a comma-separated list of sub-rules that must all hold. Each
//! sub-rule is either a keyword (`required`, `checked`, `unchecked`) or a small
//! arithmetic/comparison expression over the answer, bound to the name `value`:
//!
//! ```
//! use flightcheck_core::rules::{validate_rule, CheckValue};
//!
//! let voltage = CheckValue::from("16.4");
//! assert!(validate_rule(&voltage, Some("required, >= 14.8, < 16.8")).is_ok());
//! assert!(validate_rule(&CheckValue::from("12"), Some("> 14.8")).is_err());
//! ```
//!
//! Rules are interpreted by a purpose-built lexer, parser and tree-walking evaluator
//! (see [`ast::Expr`]); nothing is handed to a general-purpose evaluator. Every failure,
//! including malformed rules, comes back as a [`RuleViolation`].
//!
//! License: MIT OR APACHE 2.0

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use ast::{Expr, Value};
pub use parser::parse_expression;

/// Errors raised while lexing, parsing or evaluating a rule expression.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown name '{0}' (only 'value', True, False and None are allowed)")]
    UnknownName(String),

    #[error("{0}")]
    UnsupportedSyntax(String),

    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("cannot apply {op} to {operand}")]
    BadOperand { op: &'static str, operand: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("'{0}' has no real result")]
    NotReal(String),
}

/// Why a checklist answer failed its rule. The `Display` text is the user-facing reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleViolation {
    #[error("Value is required (it is empty).")]
    Required,

    #[error("Must be checked.")]
    NotChecked,

    #[error("Must be unchecked.")]
    NotUnchecked,

    #[error("Condition '{rule}' not met (value: {value}).")]
    ConditionFailed { rule: String, value: String },

    #[error("Invalid rule '{rule}': {source}")]
    InvalidRule { rule: String, source: ExprError },

    #[error("Rule '{rule}' could not be evaluated: {source}")]
    EvaluationFailed { rule: String, source: ExprError },
}

/// A raw checklist answer as captured by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Default for CheckValue {
    fn default() -> Self {
        CheckValue::Text(String::new())
    }
}

impl From<bool> for CheckValue {
    fn from(b: bool) -> Self {
        CheckValue::Bool(b)
    }
}

impl From<&str> for CheckValue {
    fn from(s: &str) -> Self {
        CheckValue::Text(s.to_string())
    }
}

impl From<String> for CheckValue {
    fn from(s: String) -> Self {
        CheckValue::Text(s)
    }
}

impl From<f64> for CheckValue {
    fn from(n: f64) -> Self {
        CheckValue::Number(n)
    }
}

impl From<Option<&str>> for CheckValue {
    fn from(s: Option<&str>) -> Self {
        s.map(CheckValue::from).unwrap_or_default()
    }
}

impl fmt::Display for CheckValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckValue::Bool(true) => write!(f, "True"),
            CheckValue::Bool(false) => write!(f, "False"),
            CheckValue::Number(n) => write!(f, "{}", n),
            CheckValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl CheckValue {
    /// The value bound to `value` inside expressions: a bool stays a bool, text that
    /// parses as a float becomes a number, anything else is the trimmed text.
    pub fn normalized(&self) -> Value {
        match self {
            CheckValue::Bool(b) => Value::Bool(*b),
            CheckValue::Number(n) => Value::Number(*n),
            CheckValue::Text(s) => {
                let trimmed = s.trim();
                match trimmed.parse::<f64>() {
                    Ok(n) => Value::Number(n),
                    Err(_) => Value::Str(trimmed.to_string()),
                }
            }
        }
    }

    /// Boolean reading used by `checked`/`unchecked`.
    pub fn as_checked(&self) -> bool {
        match self {
            CheckValue::Bool(b) => *b,
            CheckValue::Number(_) => false,
            CheckValue::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        }
    }

    fn is_blank(&self) -> bool {
        self.to_string().trim().is_empty()
    }
}

/// Validates `value` against an optional rule string. An empty or absent rule passes.
pub fn validate_rule(value: &CheckValue, rule: Option<&str>) -> Result<(), RuleViolation> {
    let Some(rule) = rule.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(());
    };

    let subject = value.normalized();
    for sub_rule in split_sub_rules(rule) {
        check_sub_rule(value, &subject, sub_rule)?;
    }
    Ok(())
}

/// Tuple form of [`validate_rule`]: `(true, "")` on success, `(false, reason)` otherwise.
pub fn validate_checklist_rule(value: &CheckValue, rule: &str) -> (bool, String) {
    match validate_rule(value, Some(rule)) {
        Ok(()) => (true, String::new()),
        Err(violation) => (false, violation.to_string()),
    }
}

/// Parses every expression sub-rule of `rule` without evaluating anything.
pub fn check_rule_syntax(rule: &str) -> Result<(), RuleViolation> {
    for sub_rule in split_sub_rules(rule) {
        if Keyword::parse(sub_rule).is_some() {
            continue;
        }
        let source = with_implicit_subject(sub_rule);
        parse_expression(&source).map_err(|source| RuleViolation::InvalidRule {
            rule: sub_rule.to_string(),
            source,
        })?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Required,
    Checked,
    Unchecked,
}

impl Keyword {
    fn parse(sub_rule: &str) -> Option<Self> {
        if sub_rule.eq_ignore_ascii_case("required") {
            Some(Keyword::Required)
        } else if sub_rule.eq_ignore_ascii_case("checked") {
            Some(Keyword::Checked)
        } else if sub_rule.eq_ignore_ascii_case("unchecked") {
            Some(Keyword::Unchecked)
        } else {
            None
        }
    }
}

fn check_sub_rule(value: &CheckValue, subject: &Value, sub_rule: &str) -> Result<(), RuleViolation> {
    match Keyword::parse(sub_rule) {
        Some(Keyword::Required) if value.is_blank() => return Err(RuleViolation::Required),
        Some(Keyword::Checked) if !value.as_checked() => return Err(RuleViolation::NotChecked),
        Some(Keyword::Unchecked) if value.as_checked() => return Err(RuleViolation::NotUnchecked),
        Some(_) => return Ok(()),
        None => {}
    }

    let source = with_implicit_subject(sub_rule);
    let expr = parse_expression(&source).map_err(|source| RuleViolation::InvalidRule {
        rule: sub_rule.to_string(),
        source,
    })?;
    let result = eval::evaluate(&expr, subject).map_err(|source| RuleViolation::EvaluationFailed {
        rule: sub_rule.to_string(),
        source,
    })?;

    debug!("Rule '{}' evaluated to {:?} for value {:?}", sub_rule, result, subject);
    if result.is_truthy() {
        Ok(())
    } else {
        Err(RuleViolation::ConditionFailed {
            rule: sub_rule.to_string(),
            value: subject.to_string(),
        })
    }
}

/// `"> 10"` reads as `"value > 10"`; a lone leading `=` reads as `==`.
fn with_implicit_subject(sub_rule: &str) -> String {
    match sub_rule.chars().next() {
        Some('=') if !sub_rule.starts_with("==") => format!("value ={}", sub_rule),
        Some('>' | '<' | '=' | '!') => format!("value {}", sub_rule),
        _ => sub_rule.to_string(),
    }
}

/// Splits on commas that sit outside quotes and parentheses. Empty pieces are dropped.
fn split_sub_rules(rule: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in rule.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&rule[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&rule[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
