//! Command-line interface for firecheck.
//!
//! This module provides the CLI structure for the `firecheck` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AdminsCommand, ChecklistArg, ConfigCommand, ImportCommand, ListCommand, ReferenceArg,
    ServeCommand, SubmitCommand,
};

/// firecheck - Equipment and maintenance checklists for a volunteer fire brigade
///
/// Serves the checklist web app and manages the crew, equipment and
/// maintenance lists it reads.
#[derive(Debug, Parser)]
#[command(name = "firecheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web app
    Serve(ServeCommand),

    /// List crew members and their logins
    Crew(ListCommand),

    /// List equipment per appliance
    Equipment(ListCommand),

    /// List maintenance tasks per appliance
    Tasks(ListCommand),

    /// View or replace the admin list
    #[command(subcommand)]
    Admins(AdminsCommand),

    /// Replace a reference list with a file
    Import(ImportCommand),

    /// Validate and save a checklist from a JSON file
    Submit(SubmitCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
