//! The station: configuration plus the files it points at.
//!
//! Every operation the CLI and HTTP server expose is a method here. Nothing is
//! cached; each call reads the current files.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use crate::access::{AdminSet, AdminStore, SessionUser};
use crate::checklist::{
    maintenance, CrewChoice, MaintenanceForm, MaintenanceRequest, Outcome, PostJobForm,
    PostJobRequest, StatusRules, SubmissionKind, SubmissionStore,
};
use crate::config::Config;
use crate::error::Result;
use crate::reference::{
    self, by_display_name, Crew, EquipmentByAppliance, ReferenceKind, TasksByAppliance,
};
use crate::table;

/// Timestamp format stored in the `submitted_at` column.
const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date format used to pre-fill forms.
const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Injected context for every operation.
#[derive(Debug, Clone)]
pub struct Station {
    config: Config,
    data_dir: PathBuf,
}

/// Summary shown on the admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminOverview {
    /// Derived credentials.
    pub users: Vec<reference::CrewMember>,
    /// Equipment per appliance.
    pub equipment: EquipmentByAppliance,
    /// Current admins.
    pub admins: AdminSet,
    /// Post-job submission files.
    pub post_job_submissions: Vec<String>,
    /// Maintenance submission files.
    pub maintenance_submissions: Vec<String>,
}

impl Station {
    /// Create a station from configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let data_dir = config.data_dir();
        Self { config, data_dir }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Path of a reference file.
    #[must_use]
    pub fn reference_path(&self, kind: ReferenceKind) -> PathBuf {
        let storage = &self.config.storage;
        let name = match kind {
            ReferenceKind::Crew => &storage.crew_file,
            ReferenceKind::Equipment => &storage.equipment_file,
            ReferenceKind::Maintenance => &storage.maintenance_file,
        };
        self.data_dir.join(name)
    }

    /// Path of the derived users export.
    #[must_use]
    pub fn users_export_path(&self) -> PathBuf {
        self.data_dir.join(&self.config.storage.users_export_file)
    }

    /// The admin allow-list.
    #[must_use]
    pub fn admin_store(&self) -> AdminStore {
        AdminStore::new(
            self.data_dir.join(&self.config.storage.admin_file),
            self.config.access.default_admin.clone(),
        )
    }

    /// Submission files.
    #[must_use]
    pub fn submissions(&self) -> SubmissionStore {
        SubmissionStore::new(self.data_dir.join(&self.config.storage.submissions_dir))
    }

    /// Crew with derived credentials; refreshes the users export.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read or the export written.
    pub fn crew(&self) -> Result<Crew> {
        reference::load_crew(
            &self.reference_path(ReferenceKind::Crew),
            &self.users_export_path(),
            &self.config.access.password_suffix,
        )
    }

    /// Equipment per appliance.
    ///
    /// # Errors
    ///
    /// Returns an error if the equipment list cannot be read.
    pub fn equipment(&self) -> Result<EquipmentByAppliance> {
        reference::load_equipment(&self.reference_path(ReferenceKind::Equipment))
    }

    /// Maintenance tasks per appliance.
    ///
    /// # Errors
    ///
    /// Returns an error if the task list cannot be read.
    pub fn tasks(&self) -> Result<TasksByAppliance> {
        reference::load_tasks(&self.reference_path(ReferenceKind::Maintenance))
    }

    /// Current admins.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin list cannot be read or created.
    pub fn admins(&self) -> Result<AdminSet> {
        self.admin_store().load()
    }

    /// Replace the admin list.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin list cannot be written.
    pub fn save_admins<I, S>(&self, usernames: I) -> Result<AdminSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.admin_store().save(usernames)
    }

    /// Atomically replace a reference file with uploaded content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn replace_reference(&self, kind: ReferenceKind, content: &[u8]) -> Result<PathBuf> {
        let path = self.reference_path(kind);
        table::replace_file(&path, content)?;
        info!(%kind, path = %path.display(), bytes = content.len(), "reference file replaced");
        Ok(path)
    }

    /// Check login credentials against the derived crew table.
    ///
    /// `username` is normalized the way the login form is: trimmed, lowercased,
    /// spaces removed. The password is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<SessionUser>> {
        let username = crate::access::normalize_login(username);
        let crew = self.crew()?;
        match crew.get(&username) {
            Some(member) if member.check_password(password.trim()) => {
                info!(user = %username, "login succeeded");
                Ok(Some(SessionUser {
                    username,
                    name: member.name.clone(),
                }))
            }
            _ => {
                warn!(user = %username, "login failed");
                Ok(None)
            }
        }
    }

    /// Everything the admin page shows.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read.
    pub fn admin_overview(&self) -> Result<AdminOverview> {
        let submissions = self.submissions();
        Ok(AdminOverview {
            users: self.crew()?.into_values().collect(),
            equipment: self.equipment()?,
            admins: self.admins()?,
            post_job_submissions: submissions.list(SubmissionKind::PostJob)?,
            maintenance_submissions: submissions.list(SubmissionKind::Maintenance)?,
        })
    }

    /// Status rules for a checklist kind.
    #[must_use]
    pub fn status_rules(&self, kind: SubmissionKind) -> StatusRules {
        let checklist = &self.config.checklist;
        match kind {
            SubmissionKind::PostJob => StatusRules::new(
                &checklist.post_job_statuses,
                checklist.post_job_note_required.iter().cloned(),
            ),
            SubmissionKind::Maintenance => StatusRules::new(
                &checklist.maintenance_statuses,
                checklist.maintenance_note_required.iter().cloned(),
            ),
        }
    }

    /// The post-job form.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster or equipment list cannot be read.
    pub fn post_job_form(&self) -> Result<PostJobForm> {
        let crew = self.crew()?;
        let choices: Vec<CrewChoice> = by_display_name(&crew).into_iter().map(Into::into).collect();
        let checklist = &self.config.checklist;
        Ok(PostJobForm {
            drivers: choices.clone(),
            crew: choices,
            appliances: checklist.appliances.clone(),
            job_types: checklist.job_types.clone(),
            equipment_by_appliance: self.equipment()?,
            status_options: checklist.post_job_statuses.clone(),
            note_required: checklist.post_job_note_required.clone(),
            today: Local::now().format(FORM_DATE_FORMAT).to_string(),
        })
    }

    /// The maintenance form.
    ///
    /// # Errors
    ///
    /// Returns an error if the task list cannot be read.
    pub fn maintenance_form(&self) -> Result<MaintenanceForm> {
        let tasks = self.tasks()?;
        let checklist = &self.config.checklist;
        Ok(MaintenanceForm {
            appliances: maintenance::appliances(&tasks, &checklist.appliances),
            tasks_by_appliance: tasks,
            status_options: checklist.maintenance_statuses.clone(),
            note_required: checklist.maintenance_note_required.clone(),
            today: Local::now().format(FORM_DATE_FORMAT).to_string(),
        })
    }

    /// Validate and persist a post-job checklist, stamped now.
    ///
    /// # Errors
    ///
    /// Returns an error if reference files cannot be read or the submission
    /// cannot be written. Validation failures are an [`Outcome::Rejected`].
    pub fn submit_post_job(&self, request: &PostJobRequest) -> Result<Outcome> {
        self.submit_post_job_at(request, &Local::now())
    }

    /// Validate and persist a post-job checklist stamped with `at`.
    ///
    /// # Errors
    ///
    /// See [`Station::submit_post_job`].
    pub fn submit_post_job_at(
        &self,
        request: &PostJobRequest,
        at: &DateTime<Local>,
    ) -> Result<Outcome> {
        let equipment = self.equipment()?;
        if let Err(rejection) = request.validate(&equipment, &self.status_rules(SubmissionKind::PostJob)) {
            info!(appliance = %request.appliance, %rejection, "post-job checklist rejected");
            return Ok(Outcome::Rejected(rejection));
        }

        let rows = request.rows(&at.format(SUBMITTED_AT_FORMAT).to_string());
        let receipt = self.submissions().persist(SubmissionKind::PostJob, &rows, at)?;
        Ok(Outcome::Persisted(receipt))
    }

    /// Validate and persist a maintenance checklist, stamped now.
    ///
    /// # Errors
    ///
    /// Returns an error if the task list cannot be read or the submission
    /// cannot be written. Validation failures are an [`Outcome::Rejected`].
    pub fn submit_maintenance(&self, request: &MaintenanceRequest) -> Result<Outcome> {
        self.submit_maintenance_at(request, &Local::now())
    }

    /// Validate and persist a maintenance checklist stamped with `at`.
    ///
    /// # Errors
    ///
    /// See [`Station::submit_maintenance`].
    pub fn submit_maintenance_at(
        &self,
        request: &MaintenanceRequest,
        at: &DateTime<Local>,
    ) -> Result<Outcome> {
        let tasks = self.tasks()?;
        if let Err(rejection) =
            request.validate(&tasks, &self.status_rules(SubmissionKind::Maintenance))
        {
            info!(appliance = %request.appliance, %rejection, "maintenance checklist rejected");
            return Ok(Outcome::Rejected(rejection));
        }

        let rows = request.rows(&tasks, &at.format(SUBMITTED_AT_FORMAT).to_string());
        let receipt = self
            .submissions()
            .persist(SubmissionKind::Maintenance, &rows, at)?;
        Ok(Outcome::Persisted(receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{ItemReport, PostJobRow, Rejection};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn station(dir: &TempDir) -> Station {
        crate::logging::init_test_logging();
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        Station::new(config)
    }

    fn seed(station: &Station) {
        station
            .replace_reference(ReferenceKind::Crew, b"Name\nAlex Scott\nJo Bloggs\n")
            .unwrap();
        station
            .replace_reference(
                ReferenceKind::Equipment,
                b"Appliance,Equipment\nPumper,Hose\nPumper,Axe\n",
            )
            .unwrap();
    }

    #[test]
    fn test_reference_paths() {
        let dir = TempDir::new().unwrap();
        let station = station(&dir);
        assert_eq!(
            station.reference_path(ReferenceKind::Crew),
            dir.path().join("crew_list.csv")
        );
        assert_eq!(
            station.submissions().dir(SubmissionKind::Maintenance),
            dir.path().join("submissions").join("maintenance_night")
        );
    }

    #[test]
    fn test_authenticate() {
        let dir = TempDir::new().unwrap();
        let station = station(&dir);
        seed(&station);

        let user = station.authenticate(" Alex Scott ", "alexscott3865 ").unwrap();
        assert_eq!(
            user,
            Some(SessionUser {
                username: "alexscott".to_string(),
                name: "Alex Scott".to_string(),
            })
        );
        assert!(station.authenticate("alexscott", "wrong").unwrap().is_none());
        assert!(station.authenticate("nobody", "nobody3865").unwrap().is_none());
    }

    #[test]
    fn test_reference_upload_takes_effect_immediately() {
        let dir = TempDir::new().unwrap();
        let station = station(&dir);
        seed(&station);
        assert_eq!(station.equipment().unwrap()["Pumper"].len(), 2);

        station
            .replace_reference(ReferenceKind::Equipment, b"Appliance,Equipment\nFCV,Rake\n")
            .unwrap();
        let equipment = station.equipment().unwrap();
        assert!(!equipment.contains_key("Pumper"));
        assert_eq!(equipment["FCV"], ["Rake"]);
    }

    #[test]
    fn test_post_job_form() {
        let dir = TempDir::new().unwrap();
        let station = station(&dir);
        seed(&station);

        let form = station.post_job_form().unwrap();
        let names: Vec<&str> = form.drivers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alex Scott", "Jo Bloggs"]);
        assert_eq!(form.appliances.len(), 7);
        assert_eq!(form.equipment_by_appliance["Pumper"], ["Hose", "Axe"]);
    }

    #[test]
    fn test_submit_post_job_rejected_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let station = station(&dir);
        seed(&station);

        let request = PostJobRequest {
            appliance: "Pumper".to_string(),
            ..PostJobRequest::default()
        };
        let outcome = station.submit_post_job(&request).unwrap();
        assert_eq!(outcome, Outcome::Rejected(Rejection::NoItems));
        assert!(station.submissions().list(SubmissionKind::PostJob).unwrap().is_empty());
    }

    #[test]
    fn test_submit_post_job_persists() {
        let dir = TempDir::new().unwrap();
        let station = station(&dir);
        seed(&station);

        let request = PostJobRequest {
            date: "2024-05-01".to_string(),
            driver: "alexscott".to_string(),
            crew: vec!["jobloggs".to_string()],
            job_type: "Hazmat".to_string(),
            appliance: "Pumper".to_string(),
            confirmed_ready: false,
            items: vec![
                ItemReport::new("Hose", "Damaged or Lost", "leak"),
                ItemReport::new("Axe", "Ready for Use", ""),
            ],
        };
        let at = Local.timestamp_opt(1_714_560_000, 0).unwrap();
        let outcome = station.submit_post_job_at(&request, &at).unwrap();

        let receipt = outcome.receipt().unwrap();
        assert_eq!(receipt.file_name, "post_job_1714560000.csv");
        let rows: Vec<PostJobRow> = table::read_rows(&receipt.path).unwrap();
        assert_eq!(rows, request.rows(&at.format(SUBMITTED_AT_FORMAT).to_string()));
    }

    #[test]
    fn test_admin_overview() {
        let dir = TempDir::new().unwrap();
        let station = station(&dir);
        seed(&station);

        let overview = station.admin_overview().unwrap();
        assert_eq!(overview.users.len(), 2);
        assert!(overview.admins.contains("alexscott"));
        assert!(overview.post_job_submissions.is_empty());
        assert!(station.users_export_path().exists());
    }
}
