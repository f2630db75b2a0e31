//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::checklist::SubmissionKind;
use crate::reference::ReferenceKind;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
}

/// Arguments shared by the listing commands.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Admin list commands.
#[derive(Debug, Subcommand)]
pub enum AdminsCommand {
    /// Show the current admins
    List,

    /// Replace the admin list
    Set {
        /// Usernames to make admins
        #[arg(required = true, value_name = "USER")]
        users: Vec<String>,
    },
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Which reference list to replace
    #[arg(value_enum)]
    pub kind: ReferenceArg,

    /// File to import
    pub file: PathBuf,
}

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Which checklist the file holds
    #[arg(value_enum)]
    pub kind: ChecklistArg,

    /// JSON submission file
    pub file: PathBuf,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Reference list argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReferenceArg {
    /// Crew roster
    Crew,
    /// Equipment list
    Equipment,
    /// Maintenance task list
    Maintenance,
}

impl From<ReferenceArg> for ReferenceKind {
    fn from(arg: ReferenceArg) -> Self {
        match arg {
            ReferenceArg::Crew => Self::Crew,
            ReferenceArg::Equipment => Self::Equipment,
            ReferenceArg::Maintenance => Self::Maintenance,
        }
    }
}

/// Checklist kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChecklistArg {
    /// Post-job equipment checklist
    PostJob,
    /// Maintenance-night task checklist
    Maintenance,
}

impl From<ChecklistArg> for SubmissionKind {
    fn from(arg: ChecklistArg) -> Self {
        match arg {
            ChecklistArg::PostJob => Self::PostJob,
            ChecklistArg::Maintenance => Self::Maintenance,
        }
    }
}
