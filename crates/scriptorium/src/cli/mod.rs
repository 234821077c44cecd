//! Command-line interface module.

mod commands;
mod run;
mod serve;

pub use commands::{Cli, Commands};
pub use run::{run_story, run_translation};
pub use serve::handle_serve_command;
