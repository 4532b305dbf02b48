//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// chatsync - Keep remote AI chats in sync with a local project tree.
///
/// 🤖 Typical flow: chatsync config set-project --id <uuid> | chat pull --dry-run | chat pull
#[derive(Parser, Debug)]
#[command(name = "chatsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Never prompt; confirmations are declined and inputs take their default.
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with remote chats.
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Manage global and project configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    /// Download chats into the project's chat directory.
    Pull {
        /// Show what would be downloaded without changing anything.
        #[arg(long)]
        dry_run: bool,

        /// Copy the existing chat directory aside before downloading.
        #[arg(long)]
        backup_existing: bool,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,

        /// Pull every chat of the organization, not only the active project's.
        #[arg(short, long)]
        all: bool,
    },

    /// List the organization's chats.
    Ls {
        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Delete chats, one interactively or all of them.
    Rm {
        /// Delete every chat of the organization.
        #[arg(short, long)]
        all: bool,
    },

    /// Create a new chat in the active project or one of its submodules.
    Init {
        /// Name of the new chat.
        #[arg(short, long)]
        name: Option<String>,

        /// Project id to attach the chat to (prompted when omitted).
        #[arg(short, long)]
        project: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a default global configuration file if none exists.
    Init,

    /// Show the resolved configuration for the current directory.
    Show,

    /// Associate the current directory with a remote project.
    SetProject {
        /// Project id.
        #[arg(long)]
        id: String,

        /// Project name (used to recognize submodules).
        #[arg(long)]
        name: Option<String>,

        /// Organization id for this project.
        #[arg(long)]
        organization: Option<String>,
    },
}

/// Parse an output format argument.
///
/// # Errors
/// Returns a message naming the accepted formats.
pub fn parse_format(format: &str) -> Result<OutputFormat, String> {
    format.parse()
}
