//! Post-job equipment checklist.
//!
//! After a call-out the crew records the state of every piece of equipment on
//! the appliance they used.

use serde::{Deserialize, Serialize};

use super::{validate_items, ItemReport, Rejection, StatusRules};
use crate::reference::{CrewMember, EquipmentByAppliance};

/// Separator used when the crew list is flattened into one cell.
pub const CREW_SEPARATOR: &str = ";";

/// A post-job checklist as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostJobRequest {
    /// Date of the job, as entered.
    pub date: String,
    /// Driver's username.
    pub driver: String,
    /// Usernames of the crew on the job.
    pub crew: Vec<String>,
    /// Kind of job.
    pub job_type: String,
    /// Appliance the checklist covers.
    pub appliance: String,
    /// The crew confirmed the appliance is ready for the next job.
    pub confirmed_ready: bool,
    /// One report per equipment item.
    pub items: Vec<ItemReport>,
}

/// One persisted row. Field order is the file's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostJobRow {
    /// When the checklist was accepted.
    pub submitted_at: String,
    /// Date of the job.
    pub date: String,
    /// Driver's username.
    pub driver: String,
    /// Crew usernames joined by [`CREW_SEPARATOR`].
    pub crew: String,
    /// Kind of job.
    pub job_type: String,
    /// Appliance.
    pub appliance: String,
    /// Equipment item.
    pub equipment_name: String,
    /// Chosen status.
    pub status: String,
    /// Note, trimmed.
    pub note: String,
    /// Ready-for-next-job confirmation.
    pub confirmed_ready: bool,
}

impl PostJobRequest {
    /// Check the request against the equipment list and status rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] found.
    pub fn validate(
        &self,
        equipment: &EquipmentByAppliance,
        rules: &StatusRules,
    ) -> Result<(), Rejection> {
        let listed = equipment.get(&self.appliance);
        validate_items(
            &self.items,
            &self.appliance,
            |item| listed.is_some_and(|names| names.iter().any(|n| n == item)),
            rules,
        )
    }

    /// Denormalize into one row per item.
    #[must_use]
    pub fn rows(&self, submitted_at: &str) -> Vec<PostJobRow> {
        let crew = self.crew.join(CREW_SEPARATOR);
        self.items
            .iter()
            .map(|report| PostJobRow {
                submitted_at: submitted_at.to_string(),
                date: self.date.clone(),
                driver: self.driver.clone(),
                crew: crew.clone(),
                job_type: self.job_type.clone(),
                appliance: self.appliance.clone(),
                equipment_name: report.item.clone(),
                status: report.status.clone(),
                note: report.note.trim().to_string(),
                confirmed_ready: self.confirmed_ready,
            })
            .collect()
    }
}

/// A crew member as offered in the driver and crew pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewChoice {
    /// Username submitted back.
    pub username: String,
    /// Name shown.
    pub name: String,
}

impl From<&CrewMember> for CrewChoice {
    fn from(member: &CrewMember) -> Self {
        Self {
            username: member.username.clone(),
            name: member.name.clone(),
        }
    }
}

/// Everything needed to draw the post-job form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostJobForm {
    /// Driver choices, sorted by name.
    pub drivers: Vec<CrewChoice>,
    /// Crew choices, sorted by name.
    pub crew: Vec<CrewChoice>,
    /// Appliances to pick from.
    pub appliances: Vec<String>,
    /// Job types to pick from.
    pub job_types: Vec<String>,
    /// Equipment per appliance.
    pub equipment_by_appliance: EquipmentByAppliance,
    /// Status options.
    pub status_options: Vec<String>,
    /// Statuses that need a note.
    pub note_required: Vec<String>,
    /// Default date for the form.
    pub today: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment() -> EquipmentByAppliance {
        EquipmentByAppliance::from([(
            "Pumper".to_string(),
            vec!["Hose".to_string(), "Axe".to_string()],
        )])
    }

    fn rules() -> StatusRules {
        let config = crate::config::ChecklistConfig::default();
        StatusRules::new(&config.post_job_statuses, config.post_job_note_required)
    }

    fn request(items: Vec<ItemReport>) -> PostJobRequest {
        PostJobRequest {
            date: "2024-05-01".to_string(),
            driver: "alexscott".to_string(),
            crew: vec!["jobloggs".to_string(), "samlee".to_string()],
            job_type: "Structure Fire".to_string(),
            appliance: "Pumper".to_string(),
            confirmed_ready: true,
            items,
        }
    }

    #[test]
    fn test_validate_accepts_listed_items() {
        let req = request(vec![ItemReport::new("Hose", "Damaged or Lost", "leak")]);
        assert!(req.validate(&equipment(), &rules()).is_ok());
    }

    #[test]
    fn test_validate_requires_note() {
        let req = request(vec![ItemReport::new("Hose", "Damaged or Lost", "")]);
        let err = req.validate(&equipment(), &rules()).unwrap_err();
        assert!(err.to_string().contains("Hose"));
        assert!(err.to_string().contains("Damaged or Lost"));
    }

    #[test]
    fn test_validate_unknown_appliance_rejects_items() {
        let mut req = request(vec![ItemReport::new("Hose", "Ready for Use", "")]);
        req.appliance = "Tanker 2".to_string();
        assert!(matches!(
            req.validate(&equipment(), &rules()),
            Err(Rejection::UnknownItem { .. })
        ));
    }

    #[test]
    fn test_validate_empty() {
        let req = request(Vec::new());
        assert_eq!(req.validate(&equipment(), &rules()), Err(Rejection::NoItems));
    }

    #[test]
    fn test_rows_denormalize() {
        let req = request(vec![
            ItemReport::new("Hose", "Ready for Use", ""),
            ItemReport::new("Axe", "Note for follow-up", "  blunt  "),
        ]);
        let rows = req.rows("2024-05-01T21:30:00");

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.submitted_at, "2024-05-01T21:30:00");
            assert_eq!(row.crew, "jobloggs;samlee");
            assert_eq!(row.appliance, "Pumper");
            assert!(row.confirmed_ready);
        }
        assert_eq!(rows[1].equipment_name, "Axe");
        assert_eq!(rows[1].note, "blunt");
    }

    #[test]
    fn test_rows_column_order() {
        let req = request(vec![ItemReport::new("Hose", "Ready for Use", "")]);
        let bytes = crate::table::serialize_rows(&req.rows("now")).unwrap();
        let header = String::from_utf8(bytes).unwrap();
        assert!(header.starts_with(
            "submitted_at,date,driver,crew,job_type,appliance,equipment_name,status,note,confirmed_ready\n"
        ));
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let req: PostJobRequest = serde_json::from_str(r#"{"appliance": "Pumper"}"#).unwrap();
        assert!(req.items.is_empty());
        assert!(req.crew.is_empty());
        assert!(!req.confirmed_ready);
    }
}
