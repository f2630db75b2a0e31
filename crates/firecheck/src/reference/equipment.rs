//! Equipment carried on each appliance.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::table::{self, Field, Table};

/// Appliance name to equipment names, in roster order.
pub type EquipmentByAppliance = BTreeMap<String, Vec<String>>;

/// Group equipment rows under their appliance.
///
/// Empty when either the appliance or the equipment column cannot be found.
#[must_use]
pub fn equipment_from_table(table: &Table) -> EquipmentByAppliance {
    let resolver = table.resolver();
    let (Some(appliance_col), Some(equipment_col)) = (
        resolver.resolve(Field::Appliance),
        resolver.resolve(Field::Equipment),
    ) else {
        debug!(headers = ?table.headers(), "equipment list lacks appliance or equipment column");
        return EquipmentByAppliance::new();
    };

    let mut out = EquipmentByAppliance::new();
    for row in table.rows() {
        let appliance = Table::cell(row, Some(appliance_col));
        let equipment = Table::cell(row, Some(equipment_col));
        if appliance.is_empty() || equipment.is_empty() {
            continue;
        }
        out.entry(appliance.to_string())
            .or_default()
            .push(equipment.to_string());
    }
    out
}

/// Load the equipment list from disk.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_equipment(path: &Path) -> Result<EquipmentByAppliance> {
    let equipment = equipment_from_table(&table::read_table(path)?);
    debug!(appliances = equipment.len(), "loaded equipment list");
    Ok(equipment)
}
