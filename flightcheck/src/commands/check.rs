// flightcheck/src/commands/check.rs
//! `flightcheck check`: validate a log entry draft the way the save action does.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use is_terminal::IsTerminal;
use log::info;
use std::fs;
use std::io;

use flightcheck_core::{validate_log_entry, EngineSettings, LogEntryDraft};

use crate::cli::CheckCommand;
use crate::commands::{error_msg, warn_msg, CommandStatus};
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn run_check(cmd: &CheckCommand, settings: &EngineSettings, theme: &ThemeMap) -> Result<CommandStatus> {
    let text = fs::read_to_string(&cmd.entry)
        .with_context(|| format!("Failed to read log entry from {}", cmd.entry.display()))?;
    let mut entry: LogEntryDraft = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse log entry {}", cmd.entry.display()))?;

    settings.apply_checklist_rules(&mut entry);

    let date = entry.date.trim();
    if !date.is_empty() && NaiveDate::parse_from_str(date, ENTRY_DATE_FORMAT).is_err() {
        warn_msg(format!("Date '{}' is not in YYYY-MM-DD format.", date), theme);
    }
    if !entry.vehicle.trim().is_empty() && !settings.vehicles.contains(&entry.vehicle) {
        warn_msg(format!("Vehicle '{}' is not in the configured vehicle list.", entry.vehicle), theme);
    }

    match validate_log_entry(&entry) {
        Ok(()) => {
            info!("Log entry '{}' passed validation.", entry.flight_no);
            let stdout = io::stdout();
            let supports_color = stdout.is_terminal();
            output_format::print_success_message(
                &mut stdout.lock(),
                &format!("Log entry '{}' is valid.", entry.flight_no),
                theme,
                supports_color,
            )?;
            Ok(CommandStatus::Success)
        }
        Err(errors) => {
            for error in &errors {
                error_msg(error, theme);
            }
            Ok(CommandStatus::Failed)
        }
    }
}
