//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scriptorium - LLM batch translation and story generation for spreadsheets
#[derive(Parser, Debug)]
#[command(name = "scriptorium")]
#[command(about = "LLM batch translation and story generation for spreadsheets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Export spans through OpenTelemetry (stdout exporter)
    #[arg(long, global = true)]
    pub telemetry: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run a batch translation request from a JSON file
    Translate {
        /// Path to the request JSON
        request: PathBuf,
    },

    /// Run a story generation request from a JSON file
    Story {
        /// Path to the request JSON
        request: PathBuf,
    },
}
