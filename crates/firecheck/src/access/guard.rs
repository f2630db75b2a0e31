//! Route guards.
//!
//! Handlers state what they need as a [`Requirement`]; [`authorize`] turns the
//! current session and admin set into an [`Access`] decision before the
//! handler body runs.

use serde::{Deserialize, Serialize};

use super::admins::AdminSet;

/// The logged-in crew member attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Derived username.
    pub username: String,
    /// Display name from the crew roster.
    pub name: String,
}

/// What a route requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone.
    Public,
    /// Any logged-in crew member.
    Login,
    /// A logged-in crew member on the admin list.
    Admin,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Proceed with the handler.
    Allowed,
    /// Send the caller to the login page, returning to `next` afterwards.
    RedirectToLogin {
        /// Path to come back to.
        next: String,
    },
    /// Logged in but not permitted.
    Forbidden,
}

impl Access {
    /// Whether the handler may run.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decide whether a request may proceed.
///
/// `admins` is only consulted for [`Requirement::Admin`].
#[must_use]
pub fn authorize(
    requirement: Requirement,
    user: Option<&SessionUser>,
    admins: &AdminSet,
    path: &str,
) -> Access {
    match (requirement, user) {
        (Requirement::Public, _) => Access::Allowed,
        (_, None) => Access::RedirectToLogin {
            next: path.to_string(),
        },
        (Requirement::Login, Some(_)) => Access::Allowed,
        (Requirement::Admin, Some(user)) => {
            if admins.contains(&user.username.to_lowercase()) {
                Access::Allowed
            } else {
                Access::Forbidden
            }
        }
    }
}
