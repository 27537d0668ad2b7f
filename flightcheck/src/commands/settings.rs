// flightcheck/src/commands/settings.rs
//! `flightcheck settings`: print the effective settings.

use anyhow::{Context, Result};
use std::io::{self, Write};

use flightcheck_core::EngineSettings;

use crate::cli::SettingsCommand;
use crate::commands::CommandStatus;

pub fn run_settings(cmd: &SettingsCommand, settings: &EngineSettings) -> Result<CommandStatus> {
    let rendered = if cmd.json {
        settings.to_json_pretty()?
    } else {
        serde_yml::to_string(settings).context("Failed to serialize settings as YAML")?
    };
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    writeln!(writer, "{}", rendered.trim_end())?;
    Ok(CommandStatus::Success)
}
