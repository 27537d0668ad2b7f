// flightcheck/src/commands/diff.rs
//! `flightcheck diff`: compare a current parameter dump against a reference.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};

use flightcheck_core::{compare_params, EngineSettings};

use crate::cli::DiffCommand;
use crate::commands::CommandStatus;
use crate::ui::diff_table;
use crate::ui::theme::ThemeMap;

/// The ignore patterns for this run: the configured ones (unless disabled) followed by
/// the command-line ones, without duplicates.
pub fn effective_patterns(cmd: &DiffCommand, settings: &EngineSettings) -> Vec<String> {
    let mut patterns: Vec<String> = if cmd.no_default_ignores {
        Vec::new()
    } else {
        settings.ignore_patterns.clone()
    };
    for pattern in &cmd.ignore {
        if !patterns.contains(pattern) {
            patterns.push(pattern.clone());
        }
    }
    patterns
}

pub fn run_diff(cmd: &DiffCommand, settings: &EngineSettings, theme: &ThemeMap) -> Result<CommandStatus> {
    let current = fs::read_to_string(&cmd.current)
        .with_context(|| format!("Failed to read current parameters from {}", cmd.current.display()))?;
    let reference = fs::read_to_string(&cmd.reference)
        .with_context(|| format!("Failed to read reference parameters from {}", cmd.reference.display()))?;

    let patterns = effective_patterns(cmd, settings);
    debug!("Comparing with {} ignore pattern(s): {:?}", patterns.len(), patterns);
    let diff = compare_params(&current, &reference, &patterns);
    info!(
        "Compared {} against {}: {} difference(s).",
        cmd.current.display(),
        cmd.reference.display(),
        diff.total()
    );

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.json {
        let json = serde_json::to_string_pretty(&diff).context("Failed to serialize diff")?;
        writeln!(writer, "{}", json)?;
    } else {
        let supports_color = stdout.is_terminal();
        diff_table::print_diff(&diff, &mut writer, theme, supports_color)?;
    }

    if cmd.fail_on_diff && !diff.is_empty() {
        Ok(CommandStatus::Failed)
    } else {
        Ok(CommandStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn command(ignore: &[&str], no_default_ignores: bool) -> DiffCommand {
        DiffCommand {
            current: PathBuf::from("current.param"),
            reference: PathBuf::from("reference.param"),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
            no_default_ignores,
            json: false,
            fail_on_diff: false,
        }
    }

    #[test]
    fn test_effective_patterns() {
        let settings = EngineSettings {
            ignore_patterns: vec!["STAT_*".to_string()],
            ..EngineSettings::default()
        };
        assert_eq!(effective_patterns(&command(&["PID_*", "STAT_*"], false), &settings), vec!["STAT_*", "PID_*"]);
        assert_eq!(effective_patterns(&command(&["PID_*"], true), &settings), vec!["PID_*"]);
    }
}
