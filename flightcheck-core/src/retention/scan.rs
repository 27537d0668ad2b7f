//! scan.rs - Fresh, per-pass snapshots of the capture directory.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate};
use log::{debug, warn};

/// Filenames produced by the log copier start with the flight date.
const FILENAME_DATE_FORMAT: &str = "%Y-%m-%d";
const FILENAME_DATE_LEN: usize = 10;

/// A captured log file as seen at the start of a retention pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: SystemTime,
}

impl FileRecord {
    /// The flight date from a leading `YYYY-MM-DD` in the file name, if there is one.
    pub fn filename_date(&self) -> Option<NaiveDate> {
        let name = self.path.file_name()?.to_str()?;
        let prefix = name.get(..FILENAME_DATE_LEN)?;
        NaiveDate::parse_from_str(prefix, FILENAME_DATE_FORMAT).ok()
    }

    /// The date used by the age pass: the filename date, else the local mtime date.
    pub fn log_date(&self) -> NaiveDate {
        self.filename_date()
            .unwrap_or_else(|| DateTime::<Local>::from(self.modified).date_naive())
    }
}

/// The result of listing the capture directory.
#[derive(Debug, Default)]
pub struct DirectoryScan {
    pub records: Vec<FileRecord>,
    pub excluded: usize,
    pub unreadable: usize,
}

/// Resolves a path to an absolute form for comparison. The path is canonicalised when
/// it exists, otherwise made absolute relative to the working directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Lists the regular files directly inside `dir`, skipping excluded paths and entries
/// whose metadata can't be read. Returns `None` if the directory can't be listed.
pub fn scan_directory(dir: &Path, excluded_paths: &[PathBuf]) -> Option<DirectoryScan> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(
                target: "flightcheck_core::retention",
                "Cannot list {}: {}. Nothing to clean.",
                dir.display(),
                e
            );
            return None;
        }
    };

    let excluded: HashSet<PathBuf> = excluded_paths.iter().map(|p| normalize_path(p)).collect();
    let dir_abs = normalize_path(dir);
    let mut scan = DirectoryScan::default();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(target: "flightcheck_core::retention", "Skipping unreadable entry in {}: {}", dir.display(), e);
                scan.unreadable += 1;
                continue;
            }
        };

        // Recorded under the resolved directory, so a symlinked capture dir still
        // compares equal to excluded paths given through the link.
        let path = dir_abs.join(entry.file_name());
        if excluded.contains(&path) || excluded.contains(&normalize_path(&entry.path())) {
            debug!(target: "flightcheck_core::retention", "Skipping excluded file {}", path.display());
            scan.excluded += 1;
            continue;
        }

        // Symlinks are not followed: only regular files inside the directory are owned by it.
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(target: "flightcheck_core::retention", "Skipping {}: cannot read metadata: {}", path.display(), e);
                scan.unreadable += 1;
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                warn!(target: "flightcheck_core::retention", "Skipping {}: no modification time: {}", path.display(), e);
                scan.unreadable += 1;
                continue;
            }
        };

        scan.records.push(FileRecord {
            path,
            size_bytes: metadata.len(),
            modified,
        });
    }

    Some(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from("/logs").join(name),
            size_bytes: 0,
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_filename_date_prefix() {
        assert_eq!(
            record("2024-03-05_Quad_1_flight.bin").filename_date(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(record("flight.bin").filename_date(), None);
        assert_eq!(record("2024-13-05_bad.bin").filename_date(), None);
        assert_eq!(record("2024").filename_date(), None);
    }

    #[test]
    fn test_log_date_falls_back_to_mtime() {
        let r = record("no_date.bin");
        assert_eq!(r.log_date(), DateTime::<Local>::from(SystemTime::UNIX_EPOCH).date_naive());
    }
}
