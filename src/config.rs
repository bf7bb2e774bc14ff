//! Command line interface for the quotawatch binary.
//!
//! File-based settings live in `quotawatch_core::config`; this module only
//! defines the clap surface and how its overrides land on those settings.

use clap::{Parser, Subcommand};
use quotawatch_core::config::Settings;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Usage allowance monitor for metered API credentials"
)]
pub struct Config {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Web server port (overrides config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run one aggregation cycle and print the result to the terminal
    Check,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Merge CLI overrides into settings (CLI takes precedence)
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.web.port = port;
        }
    }
}
