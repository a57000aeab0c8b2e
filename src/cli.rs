//! Command-line interface definition for Colloquy
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, session management, authentication,
//! and generation settings.

use clap::{Parser, Subcommand};

/// Colloquy - Terminal chat client
///
/// Converse with hosted text-generation models, with chat history
/// saved locally between runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "colloquy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override the data directory used for persisted state
    #[arg(long, env = "COLLOQUY_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Colloquy
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Resume an existing session by id
        #[arg(short, long)]
        session: Option<String>,

        /// Override the configured model for this run
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage saved chat sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Manage the API credential
    Auth {
        /// Credential subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Show or change generation settings
    Settings {
        /// Settings subcommand
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List saved sessions grouped by recency
    List {
        /// Emit the list as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete a session by id
    Delete {
        /// Session id to delete
        id: String,
    },

    /// Delete every saved session
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Credential subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Store an API credential
    Set {
        /// The bearer token to store
        key: String,
    },

    /// Remove the stored credential
    Remove,

    /// Show whether a credential is configured
    Show,
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the current generation settings
    Show,

    /// Change one or more generation settings
    Set {
        /// Model identifier or catalog label
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature (0.1 - 1.0)
        #[arg(long)]
        temperature: Option<f32>,

        /// Maximum new tokens per reply (128 - 1024)
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Nucleus sampling parameter (0.1 - 1.0)
        #[arg(long)]
        top_p: Option<f32>,
    },

    /// List the models known by a short label
    Models,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
