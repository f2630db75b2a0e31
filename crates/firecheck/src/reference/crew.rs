//! Crew roster loading and the derived credentials export.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::credentials::{password_for, username_from_name};
use crate::error::Result;
use crate::table::{self, Field, Table};

/// A crew member with derived login credentials.
///
/// Field order is the column order of the users export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Name as written in the roster.
    pub name: String,
    /// Lowercase alphanumeric form of the name.
    pub username: String,
    /// Username plus the configured suffix.
    pub password: String,
}

impl CrewMember {
    /// Derive a crew member's credentials from their name.
    #[must_use]
    pub fn from_name(name: &str, password_suffix: &str) -> Self {
        let username = username_from_name(name);
        let password = password_for(&username, password_suffix);
        Self {
            name: name.to_string(),
            username,
            password,
        }
    }

    /// Whether `password` matches.
    #[must_use]
    pub fn check_password(&self, password: &str) -> bool {
        self.password == password
    }
}

/// Crew keyed by username.
pub type Crew = BTreeMap<String, CrewMember>;

/// Build the crew map from a roster table.
///
/// Names that normalize to the same username collapse; the later row wins.
/// Names without any letter or digit (`---`) are skipped, since they would
/// derive an empty username whose password is the bare suffix.
/// A roster without a name-like column yields an empty map.
#[must_use]
pub fn crew_from_table(table: &Table, password_suffix: &str) -> Crew {
    let Some(name_col) = table.resolver().resolve(Field::Name) else {
        debug!(headers = ?table.headers(), "crew list has no name column");
        return Crew::new();
    };

    let mut crew = Crew::new();
    for row in table.rows() {
        let name = Table::cell(row, Some(name_col));
        if name.is_empty() {
            continue;
        }
        let member = CrewMember::from_name(name, password_suffix);
        if member.username.is_empty() {
            debug!(crew_name = name, "skipping crew name without letters or digits");
            continue;
        }
        crew.insert(member.username.clone(), member);
    }
    crew
}

/// Load the crew roster and refresh the users export.
///
/// The export is only written when the roster produced at least one member.
///
/// # Errors
///
/// Returns an error if the roster cannot be read or the export cannot be written.
pub fn load_crew(roster: &Path, export: &Path, password_suffix: &str) -> Result<Crew> {
    let crew = crew_from_table(&table::read_table(roster)?, password_suffix);
    if crew.is_empty() {
        return Ok(crew);
    }

    let rows: Vec<&CrewMember> = crew.values().collect();
    table::write_rows(export, &rows)?;
    info!(members = crew.len(), export = %export.display(), "loaded crew");
    Ok(crew)
}

/// Crew sorted by display name, for drop-downs.
#[must_use]
pub fn by_display_name(crew: &Crew) -> Vec<&CrewMember> {
    let mut members: Vec<&CrewMember> = crew.values().collect();
    members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.username.cmp(&b.username)));
    members
}
