//! Who may do what.
//!
//! - [`credentials`]: usernames and passwords derived from the crew roster
//! - [`admins`]: the admin allow-list file
//! - [`guard`]: per-route access decisions

pub mod admins;
pub mod credentials;
pub mod guard;

pub use admins::{AdminSet, AdminStore};
pub use credentials::{normalize_login, password_for, username_from_name};
pub use guard::{authorize, Access, Requirement, SessionUser};
