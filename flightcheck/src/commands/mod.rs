// flightcheck/src/commands/mod.rs
//! Command implementations and the stderr message helpers they share.

pub mod check;
pub mod diff;
pub mod prune;
pub mod settings;
pub mod validate;

use is_terminal::IsTerminal;
use std::io;
use std::process::ExitCode;

use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// How a command ended, when it ran without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// The command ran, but what it checked did not pass.
    Failed,
}

impl From<CommandStatus> for ExitCode {
    fn from(status: CommandStatus) -> Self {
        match status {
            CommandStatus::Success => ExitCode::SUCCESS,
            CommandStatus::Failed => ExitCode::from(1),
        }
    }
}

/// Exit code for errors that stopped a command (unreadable input, bad settings).
pub const ERROR_EXIT_CODE: u8 = 2;

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let supports_color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), theme, supports_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let supports_color = io::stderr().is_terminal();
    let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), theme, supports_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let supports_color = io::stderr().is_terminal();
    let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), theme, supports_color);
}
