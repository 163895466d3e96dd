//! Command-line interface for satdash.
//!
//! This module provides the CLI structure for the `satdash` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, HealthCommand, ListCommand, ListView, OutputFormat, PositionsCommand,
    ShowCommand, SortArg, WatchCommand,
};

/// satdash - Watch tracked satellites from the terminal
///
/// Polls a satellite-tracking backend for metadata and positions, lists and
/// searches the catalogue, and draws the satellites on a spinning globe.
#[derive(Debug, Parser)]
#[command(name = "satdash")]
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

    /// Write logs to this file instead of the default
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive dashboard
    Watch(WatchCommand),

    /// List satellites
    List(ListCommand),

    /// Show one satellite
    Show(ShowCommand),

    /// Print current positions
    Positions(PositionsCommand),

    /// Ask the backend to refresh its catalogue
    Refresh,

    /// Check backend health
    Health(HealthCommand),

    /// View or validate configuration
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

    /// Check whether the command takes over the terminal.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, Command::Watch(_))
    }
}
