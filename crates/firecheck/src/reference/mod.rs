//! Reference data uploaded by admins: crew roster, equipment list, task list.
//!
//! Every loader re-reads its file on each call, so an upload takes effect on
//! the next request without a restart.

pub mod crew;
pub mod equipment;
pub mod tasks;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use crew::{by_display_name, crew_from_table, load_crew, Crew, CrewMember};
pub use equipment::{equipment_from_table, load_equipment, EquipmentByAppliance};
pub use tasks::{load_tasks, tasks_from_table, TaskRecord, TasksByAppliance};

/// Which reference file an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// The crew roster.
    Crew,
    /// The equipment list.
    Equipment,
    /// The maintenance task list.
    Maintenance,
}

impl ReferenceKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 3] = [Self::Crew, Self::Equipment, Self::Maintenance];
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crew => write!(f, "crew"),
            Self::Equipment => write!(f, "equipment"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

impl FromStr for ReferenceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crew" => Ok(Self::Crew),
            "equipment" => Ok(Self::Equipment),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(Error::UnknownReferenceKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_kind_round_trips_through_str() {
        for kind in ReferenceKind::ALL {
            assert_eq!(kind.to_string().parse::<ReferenceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_reference_kind_parse_is_lenient() {
        assert_eq!(
            " Equipment ".parse::<ReferenceKind>().unwrap(),
            ReferenceKind::Equipment
        );
    }

    #[test]
    fn test_reference_kind_unknown() {
        let err = "roster".parse::<ReferenceKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownReferenceKind(ref s) if s == "roster"));
    }

    #[test]
    fn test_reference_kind_serde() {
        let json = serde_json::to_string(&ReferenceKind::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
    }
}
