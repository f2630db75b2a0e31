//! Derived crew credentials.
//!
//! Usernames and passwords are not stored anywhere: both are computed from the
//! crew roster on every read.

/// Lowercased alphanumeric characters of a crew name.
#[must_use]
pub fn username_from_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// The password for a username: the username followed by the configured suffix.
#[must_use]
pub fn password_for(username: &str, suffix: &str) -> String {
    format!("{username}{suffix}")
}

/// Normalize what a user typed into the login form's username box.
#[must_use]
pub fn normalize_login(input: &str) -> String {
    input.trim().to_lowercase().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_from_name() {
        assert_eq!(username_from_name("Alex Scott"), "alexscott");
        assert_eq!(username_from_name("  Mary-Jane O'Neil "), "maryjaneoneil");
        assert_eq!(username_from_name("Jo Bloggs 2"), "jobloggs2");
        assert_eq!(username_from_name(""), "");
    }

    #[test]
    fn test_username_keeps_unicode_letters() {
        assert_eq!(username_from_name("Zoë Ångström"), "zoëångström");
    }

    #[test]
    fn test_password_for() {
        assert_eq!(password_for("alexscott", "3865"), "alexscott3865");
    }

    #[test]
    fn test_normalize_login() {
        assert_eq!(normalize_login(" Alex Scott "), "alexscott");
        assert_eq!(normalize_login("ALEXSCOTT"), "alexscott");
    }
}
