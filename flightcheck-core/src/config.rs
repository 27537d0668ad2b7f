//! Settings management for `flightcheck-core`.
//!
//! The engine does not own a settings store. It consumes a snapshot of ignore patterns,
//! checklist definitions, retention quotas and vehicle names, loaded from YAML (or JSON)
//! and merged over the embedded defaults.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::checklist::{ItemType, LogEntryDraft};
use crate::errors::FlightcheckError;
use crate::retention::RetentionPolicy;
use crate::rules::check_rule_syntax;

/// Maximum allowed length for an ignore pattern.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// The definition of one checklist question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChecklistItemConfig {
    pub name: String,
    #[serde(rename = "type", alias = "item_type")]
    pub item_type: ItemType,
    /// Choices for a `single_select` item.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetentionSettings {
    /// Size quota for the capture directory in GiB. 0 disables it.
    pub log_max_size_gb: Option<f64>,
    /// Age quota in days. 0 disables it.
    pub log_retention_days: Option<u32>,
}

/// A snapshot of the settings the engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineSettings {
    pub ignore_patterns: Vec<String>,
    pub checklist: Vec<ChecklistItemConfig>,
    pub retention: RetentionSettings,
    pub vehicles: Vec<String>,
}

impl EngineSettings {
    /// Loads settings from a YAML file, or JSON when the extension is `.json`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading settings from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| FlightcheckError::SettingsIo(path.display().to_string(), e))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let settings: EngineSettings = if is_json {
            serde_json::from_str(&text)
                .map_err(|e| FlightcheckError::SettingsParse(path.display().to_string(), e.to_string()))?
        } else {
            serde_yml::from_str(&text)
                .map_err(|e| FlightcheckError::SettingsParse(path.display().to_string(), e.to_string()))?
        };

        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        info!(
            "Loaded {} ignore pattern(s) and {} checklist item(s) from {}.",
            settings.ignore_patterns.len(),
            settings.checklist.len(),
            path.display()
        );
        Ok(settings)
    }

    /// Loads the default settings from the embedded configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default settings from embedded string...");
        let default_yaml = include_str!("../config/default_settings.yaml");
        let settings: EngineSettings =
            serde_yml::from_str(default_yaml).context("Failed to parse default settings")?;
        debug!("Loaded {} default checklist item(s).", settings.checklist.len());
        Ok(settings)
    }

    /// Pretty-printed JSON export of these settings.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize settings")
    }

    /// Collects every problem with these settings into a single error.
    pub fn validate(&self) -> Result<(), FlightcheckError> {
        let mut errors = Vec::new();

        for pattern in &self.ignore_patterns {
            if pattern.trim().is_empty() {
                errors.push("An ignore pattern is empty.".to_string());
            } else if pattern.len() > MAX_PATTERN_LENGTH {
                errors.push(
                    FlightcheckError::PatternLengthExceeded(
                        pattern.chars().take(40).collect(),
                        pattern.len(),
                        MAX_PATTERN_LENGTH,
                    )
                    .to_string(),
                );
            }
        }

        let mut names = HashSet::new();
        for item in &self.checklist {
            if item.name.trim().is_empty() {
                errors.push("A checklist item has an empty `name` field.".to_string());
            } else if !names.insert(item.name.as_str()) {
                errors.push(format!("Duplicate checklist item found: '{}'.", item.name));
            }

            if let Some(rule) = &item.validation_rule {
                if let Err(violation) = check_rule_syntax(rule) {
                    errors.push(format!("Checklist item '{}': {}", item.name, violation));
                }
            }

            if item.item_type == ItemType::SingleSelect && item.options.is_empty() {
                warn!("Checklist item '{}' is a single_select with no options.", item.name);
            }
        }

        if let Some(gb) = self.retention.log_max_size_gb {
            if !gb.is_finite() || gb < 0.0 {
                errors.push(format!("`log_max_size_gb` must be a non-negative number, got {}.", gb));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FlightcheckError::InvalidSettings(errors.join("\n")))
        }
    }

    /// The retention policy described by these settings.
    pub fn retention_policy(&self, excluded_paths: Vec<PathBuf>) -> RetentionPolicy {
        RetentionPolicy::from_settings(
            self.retention.log_max_size_gb.unwrap_or(0.0),
            self.retention.log_retention_days.unwrap_or(0),
            excluded_paths,
        )
    }

    pub fn find_checklist_item(&self, name: &str) -> Option<&ChecklistItemConfig> {
        self.checklist.iter().find(|item| item.name == name)
    }

    /// Fills in the configured rule for draft items that don't carry one of their own.
    pub fn apply_checklist_rules(&self, entry: &mut LogEntryDraft) {
        for item in entry.checklist.iter_mut().filter(|item| item.rule.is_none()) {
            if let Some(rule) = self
                .find_checklist_item(&item.name)
                .and_then(|config| config.validation_rule.clone())
            {
                debug!("Applying configured rule '{}' to '{}'.", rule, item.name);
                item.rule = Some(rule);
            }
        }
    }
}

/// Merges user settings over the defaults.
///
/// Ignore patterns and vehicles are unioned in order. A user checklist item replaces the
/// default with the same name and new items are appended. Retention values are replaced
/// only when the user sets them.
pub fn merge_settings(default_settings: EngineSettings, user_settings: Option<EngineSettings>) -> EngineSettings {
    let Some(user) = user_settings else {
        return default_settings;
    };
    debug!(
        "Merging user settings: {} pattern(s), {} checklist item(s).",
        user.ignore_patterns.len(),
        user.checklist.len()
    );

    let mut merged = default_settings;
    union_into(&mut merged.ignore_patterns, user.ignore_patterns);
    union_into(&mut merged.vehicles, user.vehicles);

    for item in user.checklist {
        match merged.checklist.iter_mut().find(|existing| existing.name == item.name) {
            Some(existing) => {
                debug!("Overriding checklist item '{}' with user definition.", item.name);
                *existing = item;
            }
            None => merged.checklist.push(item),
        }
    }

    if let Some(gb) = user.retention.log_max_size_gb {
        debug!("Overriding log_max_size_gb with user value: {}", gb);
        merged.retention.log_max_size_gb = Some(gb);
    }
    if let Some(days) = user.retention.log_retention_days {
        debug!("Overriding log_retention_days with user value: {}", days);
        merged.retention.log_retention_days = Some(days);
    }

    merged
}

fn union_into(target: &mut Vec<String>, extra: Vec<String>) {
    for value in extra {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}
