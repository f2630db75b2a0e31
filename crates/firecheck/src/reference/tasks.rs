//! Maintenance-night tasks for each appliance.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::table::{self, Field, Table};

/// One maintenance task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// What to do.
    pub task: String,
    /// Where on the appliance; empty when the list has no area column.
    pub area: String,
    /// Training note; empty when the list has no training column.
    pub training: String,
}

/// Appliance name to its tasks, in list order.
pub type TasksByAppliance = BTreeMap<String, Vec<TaskRecord>>;

/// Group task rows under their appliance.
///
/// The appliance and task columns are required; area and training are not.
#[must_use]
pub fn tasks_from_table(table: &Table) -> TasksByAppliance {
    let resolver = table.resolver();
    let (Some(appliance_col), Some(task_col)) = (
        resolver.resolve(Field::Appliance),
        resolver.resolve(Field::Task),
    ) else {
        debug!(headers = ?table.headers(), "task list lacks appliance or task column");
        return TasksByAppliance::new();
    };
    let area_col = resolver.resolve(Field::Area);
    let training_col = resolver.resolve(Field::Training);

    let mut out = TasksByAppliance::new();
    for row in table.rows() {
        let appliance = Table::cell(row, Some(appliance_col));
        let task = Table::cell(row, Some(task_col));
        if appliance.is_empty() || task.is_empty() {
            continue;
        }
        out.entry(appliance.to_string()).or_default().push(TaskRecord {
            task: task.to_string(),
            area: Table::cell(row, area_col).to_string(),
            training: Table::cell(row, training_col).to_string(),
        });
    }
    out
}

/// Load the maintenance task list from disk.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_tasks(path: &Path) -> Result<TasksByAppliance> {
    let tasks = tasks_from_table(&table::read_table(path)?);
    debug!(appliances = tasks.len(), "loaded maintenance tasks");
    Ok(tasks)
}
