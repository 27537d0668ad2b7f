// flightcheck/src/main.rs
//! Flightcheck entry point.
//!
//! Parses the command line, sets up logging, loads the effective settings and theme,
//! and dispatches to the selected command.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use flightcheck::cli::{Cli, Commands};
use flightcheck::commands::{self, CommandStatus, ERROR_EXIT_CODE};
use flightcheck::logger;
use flightcheck::settings::load_effective_settings;
use flightcheck::ui::theme::{build_theme_map, ThemeMap, ThemeStyle};

fn run(cli: &Cli, theme: &ThemeMap) -> Result<CommandStatus> {
    let settings = load_effective_settings(cli.config.as_deref())?;

    match &cli.command {
        Commands::Diff(cmd) => commands::diff::run_diff(cmd, &settings, theme),
        Commands::Validate(cmd) => commands::validate::run_validate(cmd, theme),
        Commands::Check(cmd) => commands::check::run_check(cmd, &settings, theme),
        Commands::Prune(cmd) => commands::prune::run_prune(cmd, &settings, theme),
        Commands::Settings(cmd) => commands::settings::run_settings(cmd, &settings),
    }
}

fn main() -> ExitCode {
    // A `.env` file may set FLIGHTCHECK_SETTINGS or RUST_LOG.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug));

    let theme = match build_theme_map(cli.theme.as_deref()).context("Theme error") {
        Ok(theme) => theme,
        Err(e) => {
            let fallback = ThemeStyle::default_theme_map();
            commands::error_msg(format!("{:#}", e), &fallback);
            return ExitCode::from(ERROR_EXIT_CODE);
        }
    };

    match run(&cli, &theme) {
        Ok(status) => status.into(),
        Err(e) => {
            commands::error_msg(format!("{:#}", e), &theme);
            ExitCode::from(ERROR_EXIT_CODE)
        }
    }
}
