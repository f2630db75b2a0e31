//! Configuration management for firecheck.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::access::credentials::username_from_name;
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "firecheck";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIRECHECK_`, sections split on `__`)
/// 2. TOML config file at `~/.config/firecheck/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where reference files and submissions live.
    pub storage: StorageConfig,
    /// Checklist vocabulary.
    pub checklist: ChecklistConfig,
    /// Login and admin settings.
    pub access: AccessConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root data directory.
    /// Defaults to `~/.local/share/firecheck`
    pub data_dir: Option<PathBuf>,
    /// Crew roster file name, relative to the data directory.
    pub crew_file: String,
    /// Equipment list file name.
    pub equipment_file: String,
    /// Maintenance task list file name.
    pub maintenance_file: String,
    /// Admin allow-list file name.
    pub admin_file: String,
    /// Derived credentials export file name.
    pub users_export_file: String,
    /// Directory holding one subdirectory per checklist kind.
    pub submissions_dir: String,
}

/// Checklist vocabulary: appliances, statuses and the statuses that need a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// Appliances offered on the post-job form, and on the maintenance form
    /// when the task list is empty.
    pub appliances: Vec<String>,
    /// Job types offered on the post-job form.
    pub job_types: Vec<String>,
    /// Status options for post-job equipment items.
    pub post_job_statuses: Vec<String>,
    /// Post-job statuses that must carry a note.
    pub post_job_note_required: Vec<String>,
    /// Status options for maintenance tasks.
    pub maintenance_statuses: Vec<String>,
    /// Maintenance statuses that must carry a note.
    pub maintenance_note_required: Vec<String>,
}

/// Login and admin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Username that is always an admin when the admin list is empty or missing.
    pub default_admin: String,
    /// Suffix appended to a username to form its password.
    pub password_suffix: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Display name returned by the home endpoint.
    pub app_name: String,
    /// Directory served under `/static`. Disabled when unset.
    pub static_dir: Option<PathBuf>,
    /// Seconds a session stays valid after its last use.
    pub session_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            crew_file: "crew_list.csv".to_string(),
            equipment_file: "equipment_list.csv".to_string(),
            maintenance_file: "maintenance_tasks.csv".to_string(),
            admin_file: "admins.txt".to_string(),
            users_export_file: "users.csv".to_string(),
            submissions_dir: "submissions".to_string(),
        }
    }
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            appliances: strings(&[
                "Pumper",
                "Tanker 1",
                "Tanker 2",
                "FCV",
                "Quick Fill",
                "Trailer",
                "Collar Tank",
            ]),
            job_types: strings(&[
                "Grass/Scrub Fire",
                "Structure Fire",
                "Motor Vehicle Accident",
                "Hazmat",
                "Training",
                "Other",
            ]),
            post_job_statuses: strings(&[
                "Ready for Use",
                "Replaced and drying",
                "Note for follow-up",
                "Tagged out for repairs",
                "Damaged or Lost",
            ]),
            post_job_note_required: strings(&[
                "Note for follow-up",
                "Tagged out for repairs",
                "Damaged or Lost",
            ]),
            maintenance_statuses: strings(&["Completed", "Not required", "Needs follow-up"]),
            maintenance_note_required: strings(&["Needs follow-up"]),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            default_admin: "alexscott".to_string(),
            password_suffix: "3865".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            app_name: "Rutherglen Fire Brigade App".to_string(),
            static_dir: None,
            session_ttl_secs: 12 * 60 * 60,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FIRECHECK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let checklist = &self.checklist;
        validate_statuses(
            "post_job",
            &checklist.post_job_statuses,
            &checklist.post_job_note_required,
        )?;
        validate_statuses(
            "maintenance",
            &checklist.maintenance_statuses,
            &checklist.maintenance_note_required,
        )?;

        if self.access.password_suffix.is_empty() {
            return Err(Error::config_validation(
                "password_suffix must not be empty",
            ));
        }

        let admin = &self.access.default_admin;
        if admin.is_empty() || username_from_name(admin) != *admin {
            return Err(Error::config_validation(format!(
                "default_admin '{admin}' must be a non-empty lowercase alphanumeric username"
            )));
        }

        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(Error::config_validation(format!(
                "invalid bind address: {}",
                self.server.bind
            )));
        }

        if self.server.session_ttl_secs == 0 {
            return Err(Error::config_validation(
                "session_ttl_secs must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Get the session lifetime.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.server.session_ttl_secs)
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| Error::config_validation(format!("invalid bind address: {}", self.server.bind)))
    }
}

fn validate_statuses(kind: &str, statuses: &[String], note_required: &[String]) -> Result<()> {
    if statuses.is_empty() {
        return Err(Error::config_validation(format!(
            "{kind}_statuses must not be empty"
        )));
    }
    let known: BTreeSet<&str> = statuses.iter().map(String::as_str).collect();
    if let Some(unknown) = note_required.iter().find(|s| !known.contains(s.as_str())) {
        return Err(Error::config_validation(format!(
            "{kind}_note_required status '{unknown}' is not one of {kind}_statuses"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.checklist.appliances.len(), 7);
        assert_eq!(config.access.default_admin, "alexscott");
        assert_eq!(config.access.password_suffix, "3865");
        assert!(config.server.static_dir.is_none());
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.data_dir.is_none());
        assert_eq!(storage.crew_file, "crew_list.csv");
        assert_eq!(storage.equipment_file, "equipment_list.csv");
        assert_eq!(storage.maintenance_file, "maintenance_tasks.csv");
        assert_eq!(storage.admin_file, "admins.txt");
        assert_eq!(storage.users_export_file, "users.csv");
    }

    #[test]
    fn test_default_note_required_statuses() {
        let checklist = ChecklistConfig::default();

        assert_eq!(
            checklist.post_job_note_required,
            vec!["Note for follow-up", "Tagged out for repairs", "Damaged or Lost"]
        );
        assert_eq!(checklist.maintenance_note_required, vec!["Needs follow-up"]);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_statuses() {
        let mut config = Config::default();
        config.checklist.maintenance_statuses.clear();
        config.checklist.maintenance_note_required.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("maintenance_statuses"));
    }

    #[test]
    fn test_validate_note_required_not_a_status() {
        let mut config = Config::default();
        config
            .checklist
            .post_job_note_required
            .push("Lost at sea".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Lost at sea"));
    }

    #[test]
    fn test_validate_empty_password_suffix() {
        let mut config = Config::default();
        config.access.password_suffix = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("password_suffix"));
    }

    #[test]
    fn test_validate_unnormalized_default_admin() {
        let mut config = Config::default();
        config.access.default_admin = "Alex Scott".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_admin"));
    }

    #[test]
    fn test_validate_bad_bind() {
        let mut config = Config::default();
        config.server.bind = "not an address".to_string();

        assert!(config.validate().is_err());
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_validate_zero_session_ttl() {
        let mut config = Config::default();
        config.server.session_ttl_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("session_ttl_secs"));
    }

    #[test]
    fn test_session_ttl_default() {
        assert_eq!(Config::default().session_ttl(), Duration::from_secs(43_200));
    }

    #[test]
    fn test_bind_addr_default() {
        let addr = Config::default().bind_addr().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_data_dir_default() {
        let config = Config::default();
        assert!(config.data_dir().to_string_lossy().contains("firecheck"));
    }

    #[test]
    fn test_data_dir_custom() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/brigade"));

        assert_eq!(config.data_dir(), PathBuf::from("/srv/brigade"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("firecheck"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/srv/brigade\"\n\n[access]\npassword_suffix = \"0000\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/srv/brigade"));
        assert_eq!(config.access.password_suffix, "0000");
        assert_eq!(config.access.default_admin, "alexscott");
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = \"nowhere\"\n").unwrap();

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_checklist_config_deserialize_partial() {
        let json = r#"{"appliances": ["Pumper"]}"#;
        let checklist: ChecklistConfig = serde_json::from_str(json).unwrap();
        assert_eq!(checklist.appliances, vec!["Pumper"]);
        assert!(!checklist.post_job_statuses.is_empty());
    }
}
