//! Checklist submissions.
//!
//! A submission is either persisted as a new CSV file or rejected with a
//! [`Rejection`] the crew member can fix; nothing in between is ever written.
//! Rejections are not errors: filesystem failures travel separately as
//! [`crate::Error`].

pub mod maintenance;
pub mod post_job;
pub mod store;

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use maintenance::{MaintenanceForm, MaintenanceRequest, MaintenanceRow};
pub use post_job::{CrewChoice, PostJobForm, PostJobRequest, PostJobRow};
pub use store::{SubmissionKind, SubmissionStore};

/// The status a crew member chose for one equipment item or task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// Equipment name or task, as listed in the reference file.
    pub item: String,
    /// One of the configured status options.
    pub status: String,
    /// Free text; required for some statuses.
    #[serde(default)]
    pub note: String,
}

impl ItemReport {
    /// Convenience constructor.
    pub fn new(item: impl Into<String>, status: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            status: status.into(),
            note: note.into(),
        }
    }
}

/// Why a submission was sent back to the form.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The submission carried no items.
    #[error("No items were captured for this checklist. Check the reference list or choose a different appliance.")]
    NoItems,

    /// An item is not on the reference list for the appliance.
    #[error("\"{item}\" is not listed for appliance \"{appliance}\".")]
    UnknownItem {
        /// The submitted item.
        item: String,
        /// The appliance it was submitted against.
        appliance: String,
    },

    /// A status is not one of the options for this checklist.
    #[error("\"{status}\" is not a valid status for \"{item}\".")]
    UnknownStatus {
        /// The item carrying the status.
        item: String,
        /// The submitted status.
        status: String,
    },

    /// A status that needs a note arrived without one.
    #[error("Note required for \"{item}\" when status is \"{status}\".")]
    NoteRequired {
        /// The item missing its note.
        item: String,
        /// The status that demands a note.
        status: String,
    },
}

/// Status options for one checklist kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRules {
    options: Vec<String>,
    note_required: BTreeSet<String>,
}

impl StatusRules {
    /// Build from the configured options and the subset that needs a note.
    pub fn new<I, S>(options: &[String], note_required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.to_vec(),
            note_required: note_required.into_iter().map(Into::into).collect(),
        }
    }

    /// Status options, in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Statuses that need a note.
    #[must_use]
    pub fn note_required(&self) -> &BTreeSet<String> {
        &self.note_required
    }

    /// Whether `status` needs a note.
    #[must_use]
    pub fn requires_note(&self, status: &str) -> bool {
        self.note_required.contains(status)
    }

    fn check(&self, report: &ItemReport) -> Result<(), Rejection> {
        if !self.options.iter().any(|o| o == &report.status) {
            return Err(Rejection::UnknownStatus {
                item: report.item.clone(),
                status: report.status.clone(),
            });
        }
        if self.requires_note(&report.status) && report.note.trim().is_empty() {
            return Err(Rejection::NoteRequired {
                item: report.item.clone(),
                status: report.status.clone(),
            });
        }
        Ok(())
    }
}

/// Check a list of item reports.
///
/// Order of checks: no items, then per item (in submission order) catalog
/// membership, status option, required note. The first failure is returned.
///
/// # Errors
///
/// Returns the first [`Rejection`] found.
pub fn validate_items<F>(
    items: &[ItemReport],
    appliance: &str,
    is_listed: F,
    rules: &StatusRules,
) -> Result<(), Rejection>
where
    F: Fn(&str) -> bool,
{
    if items.is_empty() {
        return Err(Rejection::NoItems);
    }
    for report in items {
        if !is_listed(&report.item) {
            return Err(Rejection::UnknownItem {
                item: report.item.clone(),
                appliance: appliance.to_string(),
            });
        }
        rules.check(report)?;
    }
    Ok(())
}

/// Where a persisted submission landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Checklist kind.
    pub kind: SubmissionKind,
    /// File name within the kind's directory.
    pub file_name: String,
    /// Full path of the written file.
    pub path: PathBuf,
    /// Number of item rows written.
    pub rows: usize,
}

/// The two terminal states of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to disk.
    Persisted(Receipt),
    /// Sent back to the form; nothing written.
    Rejected(Rejection),
}

impl Outcome {
    /// The receipt, when persisted.
    #[must_use]
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Persisted(receipt) => Some(receipt),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection, when rejected.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Persisted(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}
