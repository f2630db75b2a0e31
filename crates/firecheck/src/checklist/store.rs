//! Append-only submission files.
//!
//! Each accepted checklist becomes one new CSV file named
//! `<prefix>_<unix_seconds>.csv` under its kind's directory. Files are never
//! overwritten: when two submissions of the same kind land in the same second,
//! the later one gets a `_<n>` suffix.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Receipt;
use crate::error::{Error, Result};
use crate::table;

/// Give up on finding a free file name after this many same-second suffixes.
const MAX_SAME_SECOND: u32 = 1000;

/// Checklist kinds, each with its own directory and file prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    /// Post-job equipment checklist.
    PostJob,
    /// Maintenance-night task checklist.
    Maintenance,
}

impl SubmissionKind {
    /// Subdirectory of the submissions directory.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::PostJob => "post_job",
            Self::Maintenance => "maintenance_night",
        }
    }

    /// File name prefix.
    #[must_use]
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::PostJob => "post_job",
            Self::Maintenance => "maintenance",
        }
    }

    fn file_name(self, unix_seconds: i64, attempt: u32) -> String {
        if attempt == 0 {
            format!("{}_{unix_seconds}.csv", self.file_prefix())
        } else {
            format!("{}_{unix_seconds}_{attempt}.csv", self.file_prefix())
        }
    }
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PostJob => write!(f, "post-job"),
            Self::Maintenance => write!(f, "maintenance-night"),
        }
    }
}

/// Writes and lists submission files under one root directory.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    root: PathBuf,
}

impl SubmissionStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one kind.
    #[must_use]
    pub fn dir(&self, kind: SubmissionKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Write `rows` as a new submission file stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn persist<R, Tz>(&self, kind: SubmissionKind, rows: &[R], at: &DateTime<Tz>) -> Result<Receipt>
    where
        R: Serialize,
        Tz: TimeZone,
    {
        let dir = self.dir(kind);
        let bytes = table::serialize_rows(rows)?;
        let unix_seconds = at.timestamp();

        let mut staged = table::staged_file(&dir.join(kind.file_name(unix_seconds, 0)), &bytes)?;
        for attempt in 0..MAX_SAME_SECOND {
            let file_name = kind.file_name(unix_seconds, attempt);
            let path = dir.join(&file_name);
            match staged.persist_noclobber(&path) {
                Ok(_) => {
                    info!(%kind, file = %file_name, rows = rows.len(), "submission saved");
                    return Ok(Receipt {
                        kind,
                        file_name,
                        path,
                        rows: rows.len(),
                    });
                }
                Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(file = %file_name, "submission name taken, trying next suffix");
                    staged = err.file;
                }
                Err(err) => {
                    return Err(Error::Persist {
                        path,
                        source: err.error,
                    })
                }
            }
        }
        Err(Error::internal(format!(
            "no free {kind} file name for timestamp {unix_seconds}"
        )))
    }

    /// Submission files of one kind, oldest first by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn list(&self, kind: SubmissionKind) -> Result<Vec<String>> {
        let dir = self.dir(kind);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(Error::FileRead { path: dir, source }),
        };

        let prefix = format!("{}_", kind.file_prefix());
        let mut names = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && name.ends_with(".csv") {
                names.push(name);
            }
        }
        names.sort_by_key(|name| sort_key(name));
        Ok(names)
    }
}

/// (seconds, suffix) parsed from a submission file name; unparsable names sort first.
fn sort_key(name: &str) -> (i64, u32, String) {
    let stem = name.trim_end_matches(".csv");
    let mut numbers = stem.rsplit('_').map_while(|part| part.parse::<i64>().ok());
    let last = numbers.next();
    let before = numbers.next();
    let (seconds, suffix) = match (before, last) {
        (Some(seconds), Some(suffix)) => (seconds, u32::try_from(suffix).unwrap_or(0)),
        (None, Some(seconds)) => (seconds, 0),
        _ => (0, 0),
    };
    (seconds, suffix, name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        item: String,
        status: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                item: "Hose".to_string(),
                status: "Ready for Use".to_string(),
            },
            Row {
                item: "Axe".to_string(),
                status: "Damaged or Lost".to_string(),
            },
        ]
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SubmissionKind::PostJob.dir_name(), "post_job");
        assert_eq!(SubmissionKind::Maintenance.dir_name(), "maintenance_night");
        assert_eq!(SubmissionKind::Maintenance.file_prefix(), "maintenance");
        assert_eq!(SubmissionKind::PostJob.to_string(), "post-job");
    }

    #[test]
    fn test_persist_names_file_by_kind_and_second() {
        crate::logging::init_test_logging();
        let dir = TempDir::new().unwrap();
        let store = SubmissionStore::new(dir.path());

        let receipt = store
            .persist(SubmissionKind::PostJob, &rows(), &at(1_700_000_000))
            .unwrap();

        assert_eq!(receipt.file_name, "post_job_1700000000.csv");
        assert_eq!(receipt.path, dir.path().join("post_job").join("post_job_1700000000.csv"));
        assert_eq!(receipt.rows, 2);
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SubmissionStore::new(dir.path());

        let receipt = store
            .persist(SubmissionKind::Maintenance, &rows(), &at(1_700_000_000))
            .unwrap();
        let back: Vec<Row> = table::read_rows(&receipt.path).unwrap();
        assert_eq!(back, rows());
    }

    #[test]
    fn test_distinct_seconds_give_distinct_files() {
        let dir = TempDir::new().unwrap();
        let store = SubmissionStore::new(dir.path());

        let first = store.persist(SubmissionKind::PostJob, &rows(), &at(100)).unwrap();
        let second = store.persist(SubmissionKind::PostJob, &rows(), &at(101)).unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(second.file_name, "post_job_101.csv");
    }

    #[test]
    fn test_same_second_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = SubmissionStore::new(dir.path());

        let first = store.persist(SubmissionKind::PostJob, &rows()[..1], &at(100)).unwrap();
        let second = store.persist(SubmissionKind::PostJob, &rows(), &at(100)).unwrap();
        let third = store.persist(SubmissionKind::PostJob, &rows(), &at(100)).unwrap();

        assert_eq!(first.file_name, "post_job_100.csv");
        assert_eq!(second.file_name, "post_job_100_1.csv");
        assert_eq!(third.file_name, "post_job_100_2.csv");
        let original: Vec<Row> = table::read_rows(&first.path).unwrap();
        assert_eq!(original.len(), 1);
    }

    #[test]
    fn test_list_orders_by_time_then_suffix() {
        let dir = TempDir::new().unwrap();
        let store = SubmissionStore::new(dir.path());

        store.persist(SubmissionKind::PostJob, &rows(), &at(900)).unwrap();
        store.persist(SubmissionKind::PostJob, &rows(), &at(1000)).unwrap();
        store.persist(SubmissionKind::PostJob, &rows(), &at(900)).unwrap();
        store.persist(SubmissionKind::Maintenance, &rows(), &at(950)).unwrap();

        assert_eq!(
            store.list(SubmissionKind::PostJob).unwrap(),
            ["post_job_900.csv", "post_job_900_1.csv", "post_job_1000.csv"]
        );
        assert_eq!(
            store.list(SubmissionKind::Maintenance).unwrap(),
            ["maintenance_950.csv"]
        );
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SubmissionStore::new(dir.path().join("nothing"));
        assert!(store.list(SubmissionKind::PostJob).unwrap().is_empty());
    }
}
