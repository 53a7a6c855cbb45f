//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// linkpulse - URL shortener with live click updates
#[derive(Parser, Debug)]
#[command(name = "linkpulse")]
#[command(version)]
#[command(about = "URL shortener with race-free click counting and live click updates", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Write a sample configuration with all defaults
    ConfigGen {
        /// Output file; prints to stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

impl Cli {
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
