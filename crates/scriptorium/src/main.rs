//! Scriptorium CLI binary.
//!
//! - `serve`: run the HTTP API
//! - `translate <request.json>`: run one batch translation
//! - `story <request.json>`: run one story generation

use clap::Parser;
use scriptorium::{Scriptorium, ScriptoriumConfig, init_telemetry, shutdown_telemetry};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_serve_command, run_story, run_translation};

    // Credentials may live in a local .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    if cli.telemetry {
        init_telemetry()?;
    } else {
        let default_level = if cli.verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    let config = match &cli.config {
        Some(path) => ScriptoriumConfig::from_file(path)?,
        None => ScriptoriumConfig::load()?,
    };
    let app = Scriptorium::from_config(&config)?;

    let result = match cli.command {
        Commands::Serve { bind } => handle_serve_command(&app, &config, bind).await,
        Commands::Translate { request } => run_translation(&app, &request).await,
        Commands::Story { request } => run_story(&app, &request).await,
    };

    if cli.telemetry {
        shutdown_telemetry();
    }
    result?;
    Ok(())
}
