//! Command-line interface for taskpad
//!
//! This module defines the CLI structure using clap derive macros. The task
//! commands live in [`task`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod task;

/// taskpad - a local task manager
///
/// Keeps an ordered task list in a data directory. Every change is written
/// to disk before it is shown.
#[derive(Parser, Debug)]
#[command(name = "taskpad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "TASKPAD_DIR")]
    pub dir: Option<PathBuf>,

    /// Storage key for the task list (defaults to storage.key in taskpad.toml)
    #[arg(long, global = true, env = "TASKPAD_KEY")]
    pub key: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Which tasks to show: all, active, completed
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Mark a task done, or not done again
    Toggle {
        /// Task ID
        id: u64,
    },

    /// Replace a task's text
    Edit {
        /// Task ID
        id: u64,

        /// New text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete all completed tasks
    ClearCompleted {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show active, completed and total counts
    Count,
}

impl Cli {
    /// Name used for this invocation in JSON envelopes
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Toggle { .. } => "toggle",
            Commands::Edit { .. } => "edit",
            Commands::Rm { .. } => "rm",
            Commands::ClearCompleted { .. } => "clear-completed",
            Commands::Count => "count",
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let common = task::CommonOptions {
            dir: self.dir,
            key: self.key,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Add { text } => task::run_add(task::AddOptions { text, common }),
            Commands::List { filter } => task::run_list(task::ListOptions { filter, common }),
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions { id, common }),
            Commands::Edit { id, text } => {
                task::run_edit(task::EditOptions { id, text, common })
            }
            Commands::Rm { id, yes } => task::run_rm(task::RmOptions { id, yes, common }),
            Commands::ClearCompleted { yes } => {
                task::run_clear_completed(task::ClearCompletedOptions { yes, common })
            }
            Commands::Count => task::run_count(common),
        }
    }
}
