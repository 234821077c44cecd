//! HTTP server command handler.

use scriptorium::{Scriptorium, ScriptoriumConfig, ScriptoriumResult, serve};

/// Handle the `serve` command
pub async fn handle_serve_command(
    app: &Scriptorium,
    config: &ScriptoriumConfig,
    bind: Option<String>,
) -> ScriptoriumResult<()> {
    let bind = bind.unwrap_or_else(|| config.server().bind().clone());
    tracing::info!(%bind, "Starting HTTP server. Press Ctrl+C to stop.");
    serve(&bind, app.app_state()).await
}
