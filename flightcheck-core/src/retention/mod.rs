//! retention - Age and size quotas for the log capture directory.
//!
//! A pass lists the directory fresh, evicts files older than the age quota, then evicts
//! the oldest files until the directory fits the size quota. Every filesystem failure is
//! logged and skipped; a pass never aborts.
//!
//! License: MIT OR APACHE 2.0

pub mod scan;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Days, Local, NaiveDate};
use log::{debug, info, warn};

use self::scan::{scan_directory, FileRecord};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Quotas for one retention pass. A zero quota is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_size_bytes: u64,
    pub max_age_days: u32,
    pub excluded_paths: Vec<PathBuf>,
}

impl RetentionPolicy {
    pub fn new(max_size_bytes: u64, max_age_days: u32) -> Self {
        Self {
            max_size_bytes,
            max_age_days,
            excluded_paths: Vec::new(),
        }
    }

    pub fn with_excluded(mut self, excluded_paths: Vec<PathBuf>) -> Self {
        self.excluded_paths = excluded_paths;
        self
    }

    /// Builds a policy from the settings units: a size in GiB and an age in days.
    /// A size that is zero, negative or not finite disables the size quota.
    pub fn from_settings(max_size_gb: f64, retention_days: u32, excluded_paths: Vec<PathBuf>) -> Self {
        let max_size_bytes = if max_size_gb.is_finite() && max_size_gb > 0.0 {
            // Saturates at u64::MAX; a tiny positive quota stays enabled at 1 byte.
            ((max_size_gb * BYTES_PER_GIB) as u64).max(1)
        } else {
            0
        };
        Self {
            max_size_bytes,
            max_age_days: retention_days,
            excluded_paths,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max_size_bytes == 0 && self.max_age_days == 0
    }
}

/// Deletes a file on behalf of the retention pass.
pub trait FileRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Removes files from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Reports every removal as successful without touching the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRemover;

impl FileRemover for DryRunRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        debug!(target: "flightcheck_core::retention", "Dry run: would delete {}", path.display());
        Ok(())
    }
}

/// What a retention pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub deleted: Vec<PathBuf>,
    /// Files whose deletion failed, with the error message.
    pub failed: BTreeMap<PathBuf, String>,
    pub bytes_freed: u64,
    pub excluded: usize,
    pub unreadable: usize,
    /// Size of the files left in the pool after both passes.
    pub remaining_bytes: u64,
}

impl RetentionReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

/// Runs retention passes with a pluggable remover and an optional fixed date.
#[derive(Debug, Clone, Default)]
pub struct RetentionManager<R: FileRemover = FsRemover> {
    remover: R,
    today: Option<NaiveDate>,
}

impl RetentionManager<FsRemover> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: FileRemover> RetentionManager<R> {
    pub fn with_remover(remover: R) -> Self {
        Self { remover, today: None }
    }

    /// Pins "today" for the age pass instead of reading the local clock.
    pub fn on_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Applies `policy` to the files directly inside `dir`.
    pub fn enforce(&self, dir: &Path, policy: &RetentionPolicy) -> RetentionReport {
        let mut report = RetentionReport::default();
        if policy.is_disabled() {
            debug!(target: "flightcheck_core::retention", "Retention disabled, skipping {}", dir.display());
            return report;
        }

        let Some(scan) = scan_directory(dir, &policy.excluded_paths) else {
            return report;
        };
        report.excluded = scan.excluded;
        report.unreadable = scan.unreadable;
        let mut pool = scan.records;

        if policy.max_age_days > 0 {
            let today = self.today.unwrap_or_else(|| Local::now().date_naive());
            let cutoff = today
                .checked_sub_days(Days::new(u64::from(policy.max_age_days)))
                .unwrap_or(NaiveDate::MIN);
            debug!(target: "flightcheck_core::retention", "Age pass: deleting logs dated before {}", cutoff);
            pool.retain(|record| record.log_date() >= cutoff || !self.delete(record, &mut report));
        }

        let mut total: u64 = pool.iter().map(|r| r.size_bytes).sum();

        if policy.max_size_bytes > 0 && total > policy.max_size_bytes {
            debug!(
                target: "flightcheck_core::retention",
                "Size pass: {} bytes over a quota of {} bytes",
                total,
                policy.max_size_bytes
            );
            pool.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));

            let mut kept = Vec::with_capacity(pool.len());
            for record in pool {
                if total > policy.max_size_bytes && self.delete(&record, &mut report) {
                    total = total.saturating_sub(record.size_bytes);
                } else {
                    kept.push(record);
                }
            }
            pool = kept;
        }

        report.remaining_bytes = pool.iter().map(|r| r.size_bytes).sum();
        if report.deleted_count() > 0 || !report.failed.is_empty() {
            info!(
                target: "flightcheck_core::retention",
                "Retention on {}: {} deleted ({} bytes), {} failed, {} bytes remaining.",
                dir.display(),
                report.deleted_count(),
                report.bytes_freed,
                report.failed.len(),
                report.remaining_bytes
            );
        }
        report
    }

    /// Attempts one deletion and records the outcome. Returns whether the file is gone.
    fn delete(&self, record: &FileRecord, report: &mut RetentionReport) -> bool {
        match self.remover.remove_file(&record.path) {
            Ok(()) => {
                debug!(target: "flightcheck_core::retention", "Deleted {}", record.path.display());
                // A retry in the size pass supersedes an age-pass failure.
                report.failed.remove(&record.path);
                report.deleted.push(record.path.clone());
                report.bytes_freed += record.size_bytes;
                true
            }
            Err(e) => {
                warn!(target: "flightcheck_core::retention", "Could not delete {}: {}", record.path.display(), e);
                report.failed.insert(record.path.clone(), e.to_string());
                false
            }
        }
    }
}

/// Deletes files from `dir` to satisfy the quotas and returns how many were removed.
/// A zero quota is disabled.
pub fn enforce_retention(
    dir: &Path,
    max_size_bytes: u64,
    max_age_days: u32,
    excluded_paths: &[PathBuf],
) -> usize {
    let policy = RetentionPolicy::new(max_size_bytes, max_age_days).with_excluded(excluded_paths.to_vec());
    RetentionManager::new().enforce(dir, &policy).deleted_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::fs::{self, File};
    use std::io::Write;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, size: usize, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![0u8; size]).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs)).unwrap();
        path
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    /// Refuses to delete files whose name contains `locked`, recording every attempt.
    #[derive(Default)]
    struct LockingRemover {
        attempts: RefCell<Vec<PathBuf>>,
    }

    impl FileRemover for LockingRemover {
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.attempts.borrow_mut().push(path.to_path_buf());
            if path.to_string_lossy().contains("locked") {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file is locked"));
            }
            fs::remove_file(path)
        }
    }

    #[test]
    fn test_zero_quotas_delete_nothing() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "2001-01-01_old.bin", 100, 100_000);
        assert_eq!(enforce_retention(dir.path(), 0, 0, &[]), 0);
        assert!(dir.path().join("2001-01-01_old.bin").exists());
    }

    #[test]
    fn test_missing_directory_returns_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(enforce_retention(&dir.path().join("absent"), 1, 1, &[]), 0);
    }

    #[test]
    fn test_size_pass_deletes_oldest_first() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.bin", 1000, 300);
        write_file(dir.path(), "b.bin", 1000, 200);
        write_file(dir.path(), "c.bin", 1000, 100);

        let report = RetentionManager::new().enforce(dir.path(), &RetentionPolicy::new(2000, 0));
        assert_eq!(names(&report.deleted), vec!["a.bin"]);
        assert_eq!(report.bytes_freed, 1000);
        assert_eq!(report.remaining_bytes, 2000);
        assert!(!dir.path().join("a.bin").exists());
        assert!(dir.path().join("b.bin").exists());
        assert!(dir.path().join("c.bin").exists());
    }

    fn dated(today: NaiveDate, days_ago: u64, rest: &str) -> String {
        let date = today.checked_sub_days(Days::new(days_ago)).unwrap();
        format!("{}_{}", date.format("%Y-%m-%d"), rest)
    }

    #[test]
    fn test_age_pass_uses_filename_date_then_mtime() {
        let dir = TempDir::new().unwrap();
        let today = Local::now().date_naive();
        let old_name = dated(today, 13, "Quad_1.bin");
        let recent_name = dated(today, 2, "Quad_2.bin");
        write_file(dir.path(), &old_name, 10, 0);
        write_file(dir.path(), &recent_name, 10, 0);
        write_file(dir.path(), "stale_notes.txt", 10, 20 * 86_400);
        write_file(dir.path(), "fresh_notes.txt", 10, 0);

        let manager = RetentionManager::new().on_date(today);
        let mut deleted = names(&manager.enforce(dir.path(), &RetentionPolicy::new(0, 7)).deleted);
        deleted.sort();

        let mut expected = vec![old_name, "stale_notes.txt".to_string()];
        expected.sort();
        assert_eq!(deleted, expected);
        assert!(dir.path().join(&recent_name).exists());
        assert!(dir.path().join("fresh_notes.txt").exists());
    }

    #[test]
    fn test_excluded_file_survives_both_passes() {
        let dir = TempDir::new().unwrap();
        let today = Local::now().date_naive();
        let open_log = write_file(dir.path(), "2000-01-01_open.bin", 5000, 10_000);
        write_file(dir.path(), &dated(today, 1, "new.bin"), 10, 0);

        let policy = RetentionPolicy::new(100, 30).with_excluded(vec![open_log.clone()]);
        let report = RetentionManager::new().on_date(today).enforce(dir.path(), &policy);

        assert!(open_log.exists());
        assert_eq!(report.excluded, 1);
        assert_eq!(report.deleted_count(), 0);
    }

    #[test]
    fn test_failed_deletion_is_retained_and_not_counted() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "2000-01-01_locked.bin", 1000, 300);
        write_file(dir.path(), "b.bin", 1000, 200);
        write_file(dir.path(), "c.bin", 1000, 100);

        let manager = RetentionManager::with_remover(LockingRemover::default())
            .on_date(Local::now().date_naive());
        let report = manager.enforce(dir.path(), &RetentionPolicy::new(2000, 30));

        // The locked file fails in the age pass, is retried once in the size pass and the
        // next oldest file is evicted instead.
        assert_eq!(names(&report.deleted), vec!["b.bin"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(manager.remover.attempts.borrow().len(), 3);
        assert!(dir.path().join("2000-01-01_locked.bin").exists());
        assert!(dir.path().join("c.bin").exists());
    }

    /// Fails the first attempt on every path, then deletes.
    #[derive(Default)]
    struct FlakyRemover {
        seen: RefCell<HashSet<PathBuf>>,
    }

    impl FileRemover for FlakyRemover {
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            if self.seen.borrow_mut().insert(path.to_path_buf()) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
            }
            fs::remove_file(path)
        }
    }

    #[test]
    fn test_retried_deletion_is_not_reported_as_failed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "2000-01-01_a.bin", 5000, 300);

        let report = RetentionManager::with_remover(FlakyRemover::default())
            .on_date(Local::now().date_naive())
            .enforce(dir.path(), &RetentionPolicy::new(1000, 30));

        assert_eq!(names(&report.deleted), vec!["2000-01-01_a.bin"]);
        assert!(report.failed.is_empty());
        assert_eq!(report.bytes_freed, 5000);
        assert_eq!(report.remaining_bytes, 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_dry_run_reports_without_deleting() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.bin", 1000, 300);
        write_file(dir.path(), "b.bin", 1000, 100);

        let report = RetentionManager::with_remover(DryRunRemover).enforce(dir.path(), &RetentionPolicy::new(1000, 0));
        assert_eq!(names(&report.deleted), vec!["a.bin"]);
        assert!(dir.path().join("a.bin").exists());
    }

    #[test]
    fn test_policy_from_settings() {
        assert_eq!(RetentionPolicy::from_settings(2.0, 0, vec![]).max_size_bytes, 2 * 1024 * 1024 * 1024);
        assert!(RetentionPolicy::from_settings(-1.0, 0, vec![]).is_disabled());
        assert!(RetentionPolicy::from_settings(f64::NAN, 0, vec![]).is_disabled());
        assert!(!RetentionPolicy::from_settings(0.0, 3, vec![]).is_disabled());

        let tiny = RetentionPolicy::from_settings(1e-10, 0, vec![]);
        assert_eq!(tiny.max_size_bytes, 1);
        assert!(!tiny.is_disabled());
    }
}
