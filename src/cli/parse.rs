//! CLI parse: clap types for canopy. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// canopy CLI - resolve identifiers against declarative tree definitions
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(about = "Resolve identifiers against declarative console tree definitions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tree definition file (overrides the configured one)
    #[arg(long)]
    pub definitions: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Load and validate definitions, then summarize them
    Check {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Whether an identifier has any child nodes
    HasChildren {
        /// Identifier, e.g. record:Page:42 or simple:settings
        identifier: String,
        /// Piggyback bag entry (repeatable), e.g. --bag TreeId=content
        #[arg(long = "bag", value_parser = parse_bag_entry)]
        bag: Vec<(String, String)>,
    },
    /// Expand the children of an identifier
    Expand {
        identifier: String,
        #[arg(long = "bag", value_parser = parse_bag_entry)]
        bag: Vec<(String, String)>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the merged root attachments for an identifier
    Attachments {
        identifier: String,
        #[arg(long = "bag", value_parser = parse_bag_entry)]
        bag: Vec<(String, String)>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Parse a `key=value` bag entry.
pub fn parse_bag_entry(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid bag entry '{}': expected key=value", s))?;
    if key.is_empty() {
        return Err(format!("invalid bag entry '{}': empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}
