// flightcheck/src/commands/prune.rs
//! `flightcheck prune`: enforce the retention quotas on a capture directory.

use anyhow::Result;
use is_terminal::IsTerminal;
use log::info;
use std::io::{self, Write};

use flightcheck_core::{DryRunRemover, EngineSettings, RetentionManager, RetentionPolicy, RetentionReport};

use crate::cli::PruneCommand;
use crate::commands::{info_msg, warn_msg, CommandStatus};
use crate::ui::output_format::{format_bytes, paint};
use crate::ui::theme::{ThemeEntry, ThemeMap};

/// The policy for this run: settings values, overridden by any flags given.
pub fn effective_policy(cmd: &PruneCommand, settings: &EngineSettings) -> RetentionPolicy {
    let max_size_gb = cmd
        .max_size_gb
        .or(settings.retention.log_max_size_gb)
        .unwrap_or(0.0);
    let retention_days = cmd
        .retention_days
        .or(settings.retention.log_retention_days)
        .unwrap_or(0);
    RetentionPolicy::from_settings(max_size_gb, retention_days, cmd.exclude.clone())
}

pub fn run_prune(cmd: &PruneCommand, settings: &EngineSettings, theme: &ThemeMap) -> Result<CommandStatus> {
    let policy = effective_policy(cmd, settings);
    if policy.is_disabled() {
        info_msg("Retention is disabled (no size or age quota); nothing to do.", theme);
        return Ok(CommandStatus::Success);
    }
    if !cmd.dir.is_dir() {
        warn_msg(format!("{} is not a directory; nothing to clean.", cmd.dir.display()), theme);
        return Ok(CommandStatus::Success);
    }

    let report = if cmd.dry_run {
        RetentionManager::with_remover(DryRunRemover).enforce(&cmd.dir, &policy)
    } else {
        RetentionManager::new().enforce(&cmd.dir, &policy)
    };
    info!(
        "Prune of {} finished: {} deleted, {} failed.",
        cmd.dir.display(),
        report.deleted_count(),
        report.failed.len()
    );

    for (path, reason) in &report.failed {
        warn_msg(format!("Could not delete {}: {}", path.display(), reason), theme);
    }

    let stdout = io::stdout();
    let supports_color = stdout.is_terminal();
    print_report(&report, cmd.dry_run, &mut stdout.lock(), theme, supports_color)?;
    Ok(CommandStatus::Success)
}

/// Prints the deleted files and a summary line.
pub fn print_report(
    report: &RetentionReport,
    dry_run: bool,
    writer: &mut dyn Write,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let verb = if dry_run { "Would delete" } else { "Deleted" };
    for path in &report.deleted {
        writeln!(writer, "{} {}", verb, path.display())?;
    }

    let mut summary = format!(
        "{} {} file(s), freeing {}. {} remaining.",
        verb,
        report.deleted_count(),
        format_bytes(report.bytes_freed),
        format_bytes(report.remaining_bytes)
    );
    if report.excluded > 0 {
        summary.push_str(&format!(" {} excluded file(s) kept.", report.excluded));
    }
    writeln!(writer, "{}", paint(&summary, ThemeEntry::Success, theme, supports_color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;
    use flightcheck_core::RetentionSettings;
    use std::path::PathBuf;

    fn command(max_size_gb: Option<f64>, retention_days: Option<u32>) -> PruneCommand {
        PruneCommand {
            dir: PathBuf::from("logs"),
            max_size_gb,
            retention_days,
            exclude: vec![PathBuf::from("logs/open.bin")],
            dry_run: false,
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = EngineSettings {
            retention: RetentionSettings {
                log_max_size_gb: Some(1.0),
                log_retention_days: Some(30),
            },
            ..EngineSettings::default()
        };
        let policy = effective_policy(&command(None, Some(0)), &settings);
        assert_eq!(policy.max_size_bytes, 1024 * 1024 * 1024);
        assert_eq!(policy.max_age_days, 0);
        assert_eq!(policy.excluded_paths, vec![PathBuf::from("logs/open.bin")]);

        assert!(effective_policy(&command(None, None), &EngineSettings::default()).is_disabled());
    }

    #[test]
    fn test_print_report() {
        let report = RetentionReport {
            deleted: vec![PathBuf::from("/logs/a.bin")],
            bytes_freed: 2048,
            remaining_bytes: 512,
            excluded: 1,
            ..RetentionReport::default()
        };
        let mut out = Vec::new();
        print_report(&report, true, &mut out, &ThemeStyle::default_theme_map(), false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Would delete /logs/a.bin\nWould delete 1 file(s), freeing 2.00 KiB. 512 B remaining. 1 excluded file(s) kept.\n"
        );
    }
}
