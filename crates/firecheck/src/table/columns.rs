//! Mapping loosely named spreadsheet headers onto the fields we care about.
//!
//! Each logical [`Field`] carries a prioritized list of [`Rule`]s. Headers are
//! compared in normalized form: all whitespace removed, lowercased, so
//! `"Equipment Name "` becomes `equipmentname`.

use std::sync::OnceLock;

use regex::Regex;

/// Normalize a header for matching.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    whitespace.replace_all(header, "").to_lowercase()
}

/// A single header matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The normalized header equals the key. When several headers normalize
    /// to the key, the last one in file order wins.
    Exact(&'static str),
    /// The first header, in file order, whose normalized form contains the key.
    Contains(&'static str),
}

impl Rule {
    fn find(self, normalized: &[String]) -> Option<usize> {
        match self {
            Self::Exact(key) => normalized.iter().rposition(|h| h == key),
            Self::Contains(key) => normalized.iter().position(|h| h.contains(key)),
        }
    }
}

/// A logical column the loaders look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Crew member name.
    Name,
    /// Appliance (vehicle) name.
    Appliance,
    /// Equipment item name.
    Equipment,
    /// Maintenance task description.
    Task,
    /// Area of the appliance a task belongs to.
    Area,
    /// Training note attached to a task.
    Training,
}

impl Field {
    /// Matching rules, highest priority first.
    #[must_use]
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Self::Name => &[Rule::Exact("name"), Rule::Contains("name")],
            Self::Appliance => &[Rule::Exact("appliance"), Rule::Contains("appliance")],
            Self::Equipment => &[
                Rule::Exact("equipmentname"),
                Rule::Exact("equipment"),
                Rule::Contains("equip"),
            ],
            Self::Task => &[Rule::Exact("task"), Rule::Contains("task")],
            Self::Area => &[Rule::Exact("area"), Rule::Contains("area")],
            Self::Training => &[Rule::Exact("training"), Rule::Contains("train")],
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Appliance => write!(f, "appliance"),
            Self::Equipment => write!(f, "equipment"),
            Self::Task => write!(f, "task"),
            Self::Area => write!(f, "area"),
            Self::Training => write!(f, "training"),
        }
    }
}

/// Resolves logical fields to column indexes for one header row.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    normalized: Vec<String>,
}

impl ColumnResolver {
    /// Build a resolver over a header row.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            normalized: headers
                .into_iter()
                .map(|h| normalize_header(h.as_ref()))
                .collect(),
        }
    }

    /// The column index for a field, if any header matches.
    #[must_use]
    pub fn resolve(&self, field: Field) -> Option<usize> {
        field
            .rules()
            .iter()
            .find_map(|rule| rule.find(&self.normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(headers: &[&str], field: Field) -> Option<usize> {
        ColumnResolver::new(headers).resolve(field)
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Equipment Name "), "equipmentname");
        assert_eq!(normalize_header("APPLIANCE"), "appliance");
        assert_eq!(normalize_header("Task\tArea"), "taskarea");
        assert_eq!(normalize_header(""), "");
    }

    #[test]
    fn test_name_variants() {
        for headers in [
            &["Name"][..],
            &["name "][..],
            &["Full Name"][..],
            &["Crew Member Name"][..],
            &["NAME"][..],
        ] {
            assert_eq!(resolve(headers, Field::Name), Some(0), "{headers:?}");
        }
    }

    #[test]
    fn test_exact_beats_earlier_substring() {
        let headers = ["Surname", "Name", "Rank"];
        assert_eq!(resolve(&headers, Field::Name), Some(1));
    }

    #[test]
    fn test_duplicate_exact_takes_last_in_file_order() {
        let headers = ["Name", "Rank", "name "];
        assert_eq!(resolve(&headers, Field::Name), Some(2));
    }

    #[test]
    fn test_substring_takes_first_in_file_order() {
        let headers = ["Rank", "First Name", "Last Name"];
        assert_eq!(resolve(&headers, Field::Name), Some(1));
    }

    #[test]
    fn test_appliance_variants() {
        assert_eq!(resolve(&["Appliance", "Item"], Field::Appliance), Some(0));
        assert_eq!(resolve(&["Item", "appliance name"], Field::Appliance), Some(1));
        assert_eq!(resolve(&["Truck", "Item"], Field::Appliance), None);
    }

    #[test]
    fn test_equipment_priority() {
        let headers = ["Equipment Type", "Equipment", "Equipment Name"];
        assert_eq!(resolve(&headers, Field::Equipment), Some(2));

        let headers = ["Equipment Type", "Equipment"];
        assert_eq!(resolve(&headers, Field::Equipment), Some(1));

        let headers = ["Appliance", "Equip."];
        assert_eq!(resolve(&headers, Field::Equipment), Some(1));

        let headers = ["Appliance", "Item"];
        assert_eq!(resolve(&headers, Field::Equipment), None);
    }

    #[test]
    fn test_task_area_training_variants() {
        let headers = ["Appliance", "Task Description", "Work Area", "Training Notes"];
        assert_eq!(resolve(&headers, Field::Task), Some(1));
        assert_eq!(resolve(&headers, Field::Area), Some(2));
        assert_eq!(resolve(&headers, Field::Training), Some(3));

        let headers = ["Appliance", "Task", "Trainer"];
        assert_eq!(resolve(&headers, Field::Training), Some(2));
        assert_eq!(resolve(&headers, Field::Area), None);
    }

    #[test]
    fn test_empty_headers() {
        let resolver = ColumnResolver::new(Vec::<String>::new());
        assert_eq!(resolver.resolve(Field::Name), None);
    }

    #[test]
    fn test_field_display() {
        assert_eq!(Field::Equipment.to_string(), "equipment");
        assert_eq!(Field::Training.to_string(), "training");
    }
}
