//! Maintenance-night task checklist.

use serde::{Deserialize, Serialize};

use super::{validate_items, ItemReport, Rejection, StatusRules};
use crate::reference::{TaskRecord, TasksByAppliance};

/// A maintenance checklist as submitted. Items name tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceRequest {
    /// Date of the maintenance night, as entered.
    pub date: String,
    /// Appliance the checklist covers.
    pub appliance: String,
    /// One report per task.
    pub items: Vec<ItemReport>,
}

/// One persisted row. Field order is the file's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRow {
    /// When the checklist was accepted.
    pub submitted_at: String,
    /// Date of the maintenance night.
    pub date: String,
    /// Appliance.
    pub appliance: String,
    /// Task.
    pub task: String,
    /// Area, from the task list.
    pub area: String,
    /// Training note, from the task list.
    pub training: String,
    /// Chosen status.
    pub status: String,
    /// Note, trimmed.
    pub note: String,
}

impl MaintenanceRequest {
    /// Check the request against the task list and status rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] found.
    pub fn validate(&self, tasks: &TasksByAppliance, rules: &StatusRules) -> Result<(), Rejection> {
        validate_items(
            &self.items,
            &self.appliance,
            |item| self.lookup(tasks, item).is_some(),
            rules,
        )
    }

    /// Denormalize into one row per item, filling area and training from the
    /// task list.
    #[must_use]
    pub fn rows(&self, tasks: &TasksByAppliance, submitted_at: &str) -> Vec<MaintenanceRow> {
        self.items
            .iter()
            .map(|report| {
                let record = self.lookup(tasks, &report.item);
                MaintenanceRow {
                    submitted_at: submitted_at.to_string(),
                    date: self.date.clone(),
                    appliance: self.appliance.clone(),
                    task: report.item.clone(),
                    area: record.map(|r| r.area.clone()).unwrap_or_default(),
                    training: record.map(|r| r.training.clone()).unwrap_or_default(),
                    status: report.status.clone(),
                    note: report.note.trim().to_string(),
                }
            })
            .collect()
    }

    fn lookup<'a>(&self, tasks: &'a TasksByAppliance, task: &str) -> Option<&'a TaskRecord> {
        tasks
            .get(&self.appliance)
            .and_then(|records| records.iter().find(|r| r.task == task))
    }
}

/// Everything needed to draw the maintenance form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceForm {
    /// Appliances from the task list, or the configured fallback list.
    pub appliances: Vec<String>,
    /// Tasks per appliance.
    pub tasks_by_appliance: TasksByAppliance,
    /// Status options.
    pub status_options: Vec<String>,
    /// Statuses that need a note.
    pub note_required: Vec<String>,
    /// Default date for the form.
    pub today: String,
}

/// Appliances offered on the maintenance form: those in the task list, sorted,
/// or `fallback` when the list is empty.
#[must_use]
pub fn appliances(tasks: &TasksByAppliance, fallback: &[String]) -> Vec<String> {
    if tasks.is_empty() {
        fallback.to_vec()
    } else {
        tasks.keys().cloned().collect()
    }
}
