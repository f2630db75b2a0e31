//! `firecheck` - Equipment and maintenance checklists for a volunteer fire brigade
//!
//! Crew members log in with credentials derived from the crew roster and file
//! post-job equipment checklists and maintenance-night task checklists. Each
//! accepted checklist becomes a new CSV file. Admins replace the reference
//! lists and the admin allow-list.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod access;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod reference;
pub mod server;
pub mod station;
pub mod table;

pub use checklist::{Outcome, Receipt, Rejection};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use station::Station;
