// flightcheck/src/logger.rs
//! Logging setup for the flightcheck binary.
//!
//! Library crates log through the `log` facade; this installs `env_logger` as the
//! backend. Output goes to stderr so it never mixes with command output.
//! License: MIT OR APACHE 2.0

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Log level used when neither a flag nor `RUST_LOG` says otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Initializes the global logger.
///
/// `Some(level)` forces that level for every crate and ignores `RUST_LOG`. `None`
/// honours `RUST_LOG`, falling back to warnings only. Calling this twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = match level {
        Some(level) => {
            let mut builder = Builder::new();
            builder.filter_level(level);
            builder
        }
        None => Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_LEVEL)),
    };

    builder
        .target(Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(true);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized; keeping the existing one.");
    }
}

/// Maps the `--quiet`/`--debug` flags to a forced level, if any.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
