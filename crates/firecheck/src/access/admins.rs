//! The admin allow-list file.
//!
//! One lowercase username per line. The configured default admin is always
//! returned when the list is missing or empty, so the brigade can never lock
//! itself out of the admin page.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::table;

/// Normalized admin usernames.
pub type AdminSet = BTreeSet<String>;

/// Reads and writes the admin allow-list.
#[derive(Debug, Clone)]
pub struct AdminStore {
    path: PathBuf,
    default_admin: String,
}

impl AdminStore {
    /// Create a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>, default_admin: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_admin: default_admin.into(),
        }
    }

    /// Path of the allow-list file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the admin set.
    ///
    /// A missing file is created holding the default admin. A file that
    /// normalizes to nothing yields the default admin without being rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or created.
    pub fn load(&self) -> Result<AdminSet> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), admin = %self.default_admin, "creating admin list");
                table::replace_file(&self.path, format!("{}\n", self.default_admin).as_bytes())?;
                return Ok(self.fallback());
            }
            Err(source) => {
                return Err(Error::FileRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let admins = normalize(content.lines());
        if admins.is_empty() {
            warn!(path = %self.path.display(), "admin list is empty, using default admin");
            return Ok(self.fallback());
        }
        debug!(count = admins.len(), "loaded admin list");
        Ok(admins)
    }

    /// Replace the admin list. Entries are trimmed, lowercased, de-duplicated
    /// and sorted; blank entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<I, S>(&self, usernames: I) -> Result<AdminSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let admins = normalize(usernames);
        let mut content = admins.iter().cloned().collect::<Vec<_>>().join("\n");
        content.push('\n');
        table::replace_file(&self.path, content.as_bytes())?;
        info!(count = admins.len(), "saved admin list");
        Ok(admins)
    }

    /// Whether `username` is an admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be loaded.
    pub fn is_admin(&self, username: &str) -> Result<bool> {
        Ok(self.load()?.contains(&username.to_lowercase()))
    }

    fn fallback(&self) -> AdminSet {
        AdminSet::from([self.default_admin.clone()])
    }
}

fn normalize<I, S>(usernames: I) -> AdminSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    usernames
        .into_iter()
        .map(|u| u.as_ref().trim().to_lowercase())
        .filter(|u| !u.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> AdminStore {
        AdminStore::new(dir.path().join("data").join("admins.txt"), "alexscott")
    }

    #[test]
    fn test_load_missing_creates_default() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let admins = store.load().unwrap();
        assert_eq!(admins, AdminSet::from(["alexscott".to_string()]));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "alexscott\n");
    }

    #[test]
    fn test_load_empty_file_falls_back_without_rewriting() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        table::replace_file(store.path(), b"\n   \n").unwrap();

        let admins = store.load().unwrap();
        assert_eq!(admins, AdminSet::from(["alexscott".to_string()]));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "\n   \n");
    }

    #[test]
    fn test_load_normalizes() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        table::replace_file(store.path(), b"  JoBloggs \njobloggs\nSAM\n").unwrap();

        let admins = store.load().unwrap();
        assert_eq!(
            admins,
            AdminSet::from(["jobloggs".to_string(), "sam".to_string()])
        );
        assert!(!admins.contains("alexscott"));
    }

    #[test]
    fn test_save_dedupes_and_drops_blanks() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let saved = store.save(["Bob", "bob ", ""]).unwrap();
        assert_eq!(saved, AdminSet::from(["bob".to_string()]));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "bob\n");
        assert_eq!(store.load().unwrap(), saved);
    }

    #[test]
    fn test_save_sorts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.save(["zed", "amy", "Mo"]).unwrap();
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "amy\nmo\nzed\n"
        );
    }

    #[test]
    fn test_save_empty_then_load_falls_back() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.save(Vec::<String>::new()).unwrap();
        assert_eq!(
            store.load().unwrap(),
            AdminSet::from(["alexscott".to_string()])
        );
    }

    #[test]
    fn test_is_admin_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(["jobloggs"]).unwrap();

        assert!(store.is_admin("JoBloggs").unwrap());
        assert!(!store.is_admin("alexscott").unwrap());
    }
}
