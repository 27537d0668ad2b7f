// flightcheck-core/tests/retention_integration_tests.rs
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{Days, Local};
use tempfile::TempDir;

use flightcheck_core::{enforce_retention, FileRemover, RetentionManager, RetentionPolicy};

const GIB: u64 = 1024 * 1024 * 1024;

/// Creates a sparse file of `len` bytes last modified `age` ago.
fn sparse_file(dir: &Path, name: &str, len: u64, age: Duration) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    file.set_len(len).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
    path
}

struct DenyAll;

impl FileRemover for DenyAll {
    fn remove_file(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
    }
}

#[test_log::test]
fn test_three_gigabyte_files_against_two_gigabyte_quota() {
    let dir = TempDir::new().unwrap();
    let oldest = sparse_file(dir.path(), "flight_a.bin", GIB, Duration::from_secs(3 * 3600));
    let middle = sparse_file(dir.path(), "flight_b.bin", GIB, Duration::from_secs(2 * 3600));
    let newest = sparse_file(dir.path(), "flight_c.bin", GIB, Duration::from_secs(3600));

    assert_eq!(enforce_retention(dir.path(), 2 * GIB, 0, &[]), 1);
    assert!(!oldest.exists());
    assert!(middle.exists());
    assert!(newest.exists());

    // Already within quota: a second pass is a no-op.
    assert_eq!(enforce_retention(dir.path(), 2 * GIB, 0, &[]), 0);
}

#[test]
fn test_zero_quotas_never_delete() {
    let dir = TempDir::new().unwrap();
    sparse_file(dir.path(), "1999-01-01_ancient.bin", 10 * GIB, Duration::from_secs(86_400 * 9000));
    assert_eq!(enforce_retention(dir.path(), 0, 0, &[]), 0);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_excluded_paths_are_normalised() {
    let dir = TempDir::new().unwrap();
    let locked = sparse_file(dir.path(), "2000-01-01_locked.bin", GIB, Duration::from_secs(86_400 * 400));
    sparse_file(dir.path(), "recent.bin", 10, Duration::from_secs(60));

    // The caller names the locked file through a path with a `.` component.
    let alias = dir.path().join(".").join("2000-01-01_locked.bin");
    let removed = enforce_retention(dir.path(), 100, 30, &[alias]);
    assert_eq!(removed, 0);
    assert!(locked.exists());
}

#[test]
fn test_undeletable_files_do_not_count() {
    let dir = TempDir::new().unwrap();
    let today = Local::now().date_naive();
    let old = today.checked_sub_days(Days::new(90)).unwrap();
    let name = format!("{}_Quad_1_flight.bin", old.format("%Y-%m-%d"));
    let path = sparse_file(dir.path(), &name, 5000, Duration::from_secs(60));

    let report = RetentionManager::with_remover(DenyAll)
        .on_date(today)
        .enforce(dir.path(), &RetentionPolicy::new(1000, 30));

    assert_eq!(report.deleted_count(), 0);
    assert_eq!(report.bytes_freed, 0);
    assert_eq!(report.remaining_bytes, 5000);
    assert!(report.failed.values().all(|reason| reason.contains("permission denied")));
    assert!(path.exists());
}

#[test]
fn test_subdirectories_are_not_descended() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("archive");
    fs::create_dir(&nested).unwrap();
    let inner = sparse_file(&nested, "1990-01-01_old.bin", 100, Duration::from_secs(86_400 * 365));

    assert_eq!(enforce_retention(dir.path(), 1, 1, &[]), 0);
    assert!(inner.exists());
}
