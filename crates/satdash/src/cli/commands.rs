//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};

use crate::dashboard::SortKey;

/// Search and ordering shared by the list-style commands.
#[derive(Debug, Clone, Args)]
pub struct ListView {
    /// Only satellites whose name or NORAD ID contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort order
    #[arg(long, value_enum, default_value = "name")]
    pub sort: SortArg,
}

/// Watch command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    #[command(flatten)]
    pub view: ListView,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    #[command(flatten)]
    pub view: ListView,

    /// Maximum number of satellites the backend returns
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Number of satellites the backend skips
    #[arg(long)]
    pub offset: Option<usize>,

    /// Only satellites updated at or after this time (RFC 3339)
    #[arg(long, value_name = "TIME")]
    pub updated_since: Option<DateTime<Utc>>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// NORAD catalog number
    pub norad_id: u32,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Positions command arguments.
#[derive(Debug, Args)]
pub struct PositionsCommand {
    #[command(flatten)]
    pub view: ListView,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Health command arguments.
#[derive(Debug, Args)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
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
        file: Option<PathBuf>,
    },
}

/// Sort order argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortArg {
    /// By name, ignoring case
    #[default]
    Name,
    /// By NORAD ID
    Norad,
    /// Most recently updated first
    Updated,
    /// As returned by the backend
    Unsorted,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::Norad => Self::Norad,
            SortArg::Updated => Self::Updated,
            SortArg::Unsorted => Self::Unsorted,
        }
    }
}

/// Output format for the list command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON array
    Json,
    /// Linked HTML list items
    Html,
}
