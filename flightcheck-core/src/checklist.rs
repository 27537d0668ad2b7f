//! checklist.rs - Preflight checklist items and log entry validation.
//!
//! Checklist definitions live in the settings store; answers are captured by the form
//! and only pass through here transiently, on their way to [`validate_log_entry`].
//! Any error returned from it blocks the save.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::rules::{validate_rule, CheckValue};

/// The input widget a checklist item is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Checkbox,
    Text,
    SingleSelect,
}

/// One answered checklist question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub name: String,
    #[serde(rename = "type", alias = "item_type", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub value: CheckValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl ChecklistItem {
    pub fn new(name: impl Into<String>, item_type: ItemType, value: impl Into<CheckValue>) -> Self {
        Self {
            name: name.into(),
            item_type,
            value: value.into(),
            rule: None,
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Validates this item's answer against its rule, if any.
    pub fn validate(&self) -> Result<(), String> {
        validate_rule(&self.value, self.rule.as_deref())
            .map_err(|violation| format!("Checklist '{}': {}", self.name, violation))
    }
}

/// The fields of a flight log entry that must be valid before it is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntryDraft {
    pub flight_no: String,
    pub date: String,
    pub vehicle: String,
    pub checklist: Vec<ChecklistItem>,
}

/// Validates a log entry draft and returns every problem found.
///
/// The header fields are required. Each checklist item with a rule is evaluated, and a
/// failure is reported as `Checklist '<name>': <reason>`.
pub fn validate_log_entry(entry: &LogEntryDraft) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if entry.flight_no.trim().is_empty() {
        errors.push("Flight ID is required.".to_string());
    }
    if entry.vehicle.trim().is_empty() {
        errors.push("Vehicle selection is required.".to_string());
    }
    if entry.date.trim().is_empty() {
        errors.push("Date is required.".to_string());
    }

    for item in &entry.checklist {
        if let Err(message) = item.validate() {
            debug!("{}", message);
            errors.push(message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        info!(
            "Log entry '{}' failed validation with {} error(s).",
            entry.flight_no,
            errors.len()
        );
        Err(errors)
    }
}
