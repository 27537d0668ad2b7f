// flightcheck/src/cli.rs
//! This file defines the command-line interface (CLI) for the flightcheck application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "flightcheck",
    author = "Flightcheck Team",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compare parameter dumps, validate preflight checklists and prune flight logs",
    long_about = "Flightcheck compares a vehicle's current parameter dump against a recorded one (ignoring volatile keys by glob pattern), validates preflight checklist answers against their rules, and keeps a log capture directory within its age and size quotas.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all log output.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// Settings file to use instead of the discovered one.
    #[arg(
        long = "config",
        value_name = "FILE",
        env = "FLIGHTCHECK_SETTINGS",
        global = true,
        help = "Path to a settings file (YAML, or JSON with a .json extension)."
    )]
    pub config: Option<PathBuf>,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `flightcheck` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compares a current parameter dump against a reference one.
    #[command(about = "Compare a current parameter dump against a reference dump.")]
    Diff(DiffCommand),

    /// Validates a single answer against a checklist rule.
    #[command(about = "Validate a single checklist answer against a rule.")]
    Validate(ValidateCommand),

    /// Validates a whole log entry draft before it is saved.
    #[command(about = "Validate a flight log entry draft (JSON) before saving it.")]
    Check(CheckCommand),

    /// Applies the retention quotas to a log capture directory.
    #[command(about = "Delete old or excess log files from a capture directory.")]
    Prune(PruneCommand),

    /// Prints the effective settings.
    #[command(about = "Print the effective settings (defaults merged with the settings file).")]
    Settings(SettingsCommand),
}

/// Arguments for the `diff` command.
#[derive(Parser, Debug)]
pub struct DiffCommand {
    /// The parameter dump read from the vehicle.
    #[arg(long, short = 'c', value_name = "FILE", help = "Current parameter dump.")]
    pub current: PathBuf,

    /// The recorded parameter dump to compare against.
    #[arg(long, short = 'r', value_name = "FILE", help = "Reference parameter dump.")]
    pub reference: PathBuf,

    /// Extra ignore patterns, on top of those in the settings.
    #[arg(
        long = "ignore",
        short = 'i',
        value_name = "PATTERN",
        help = "Ignore parameters matching this glob (repeatable, added to the configured patterns)."
    )]
    pub ignore: Vec<String>,

    /// Skip the configured ignore patterns.
    #[arg(long = "no-default-ignores", help = "Do not apply the ignore patterns from the settings.")]
    pub no_default_ignores: bool,

    /// Print the diff as JSON.
    #[arg(long, help = "Print the diff as JSON instead of a table.")]
    pub json: bool,

    /// Exit with status 1 when differences are found.
    #[arg(long = "fail-on-diff", help = "Exit with a non-zero code if any difference is found.")]
    pub fail_on_diff: bool,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("answer").required(true).args(["value", "checked", "unchecked"])))]
pub struct ValidateCommand {
    /// The rule, e.g. "required, >= 14.8".
    #[arg(long, value_name = "RULE", help = "Validation rule (comma-separated sub-rules).")]
    pub rule: String,

    /// A text answer.
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true, help = "Text answer to validate.")]
    pub value: Option<String>,

    /// A ticked checkbox.
    #[arg(long, help = "Validate a ticked checkbox.")]
    pub checked: bool,

    /// An unticked checkbox.
    #[arg(long, help = "Validate an unticked checkbox.")]
    pub unchecked: bool,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckCommand {
    /// A JSON file holding the log entry draft.
    #[arg(long, short = 'e', value_name = "FILE", help = "Log entry draft as JSON.")]
    pub entry: PathBuf,
}

/// Arguments for the `prune` command.
#[derive(Parser, Debug)]
pub struct PruneCommand {
    /// The log capture directory.
    #[arg(value_name = "DIR", help = "Log capture directory.")]
    pub dir: PathBuf,

    /// Size quota in GiB, overriding the settings. 0 disables it.
    #[arg(long = "max-size-gb", value_name = "GB", help = "Size quota in GiB (0 = unlimited).")]
    pub max_size_gb: Option<f64>,

    /// Age quota in days, overriding the settings. 0 disables it.
    #[arg(long = "retention-days", value_name = "DAYS", help = "Age quota in days (0 = unlimited).")]
    pub retention_days: Option<u32>,

    /// Files that must never be deleted.
    #[arg(long = "exclude", short = 'x', value_name = "PATH", help = "Never delete this file (repeatable).")]
    pub exclude: Vec<PathBuf>,

    /// Report what would be deleted without deleting anything.
    #[arg(long = "dry-run", help = "Show what would be deleted without deleting.")]
    pub dry_run: bool,
}

/// Arguments for the `settings` command.
#[derive(Parser, Debug)]
pub struct SettingsCommand {
    /// Print as JSON instead of YAML.
    #[arg(long, help = "Print the settings as JSON instead of YAML.")]
    pub json: bool,
}
