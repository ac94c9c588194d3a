//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::settings::{ApiContract, Overrides};

/// Top-level CLI parser for `tasklist`.
#[derive(Debug, Parser)]
#[command(name = "tasklist", version, about = "Keep a remote todo list in your terminal")]
pub struct Cli {
    /// Base URL of the task service.
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
    /// REST contract spoken by the service.
    #[arg(long, global = true, value_enum)]
    pub contract: Option<ApiContract>,
    /// Owner assigned to new tasks.
    #[arg(long = "owner", global = true, value_name = "ID")]
    pub owner_id: Option<i64>,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Flags that override environment settings.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            contract: self.contract,
            owner_id: self.owner_id,
        }
    }
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the task list.
    #[command(alias = "ls")]
    List,
    /// Create a task.
    Add {
        /// What needs to be done.
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Flip a task between done and not done.
    Toggle {
        /// Task id.
        id: i64,
    },
    /// Delete a task.
    #[command(alias = "delete")]
    Rm {
        /// Task id.
        id: i64,
    },
    /// Interactive session that keeps the list loaded.
    Shell,
}
