// flightcheck/src/commands/validate.rs
//! `flightcheck validate`: check one answer against one rule.

use anyhow::Result;
use is_terminal::IsTerminal;
use log::debug;
use std::io;

use flightcheck_core::{validate_checklist_rule, CheckValue};

use crate::cli::ValidateCommand;
use crate::commands::{error_msg, CommandStatus};
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// The answer as the form would have captured it.
pub fn answer_from(cmd: &ValidateCommand) -> CheckValue {
    if cmd.checked {
        CheckValue::Bool(true)
    } else if cmd.unchecked {
        CheckValue::Bool(false)
    } else {
        CheckValue::from(cmd.value.as_deref())
    }
}

pub fn run_validate(cmd: &ValidateCommand, theme: &ThemeMap) -> Result<CommandStatus> {
    let answer = answer_from(cmd);
    debug!("Validating {:?} against rule '{}'", answer, cmd.rule);

    let (is_valid, reason) = validate_checklist_rule(&answer, &cmd.rule);
    if is_valid {
        let stdout = io::stdout();
        let supports_color = stdout.is_terminal();
        output_format::print_success_message(&mut stdout.lock(), "Valid.", theme, supports_color)?;
        Ok(CommandStatus::Success)
    } else {
        error_msg(reason, theme);
        Ok(CommandStatus::Failed)
    }
}
