//! One-shot request handlers.

use scriptorium::{
    JsonError, PipelineReport, Scriptorium, ScriptoriumError, ScriptoriumResult, StoryRequest,
    TranslationRequest,
};
use serde::de::DeserializeOwned;
use std::path::Path;

fn read_request<T: DeserializeOwned>(path: &Path) -> ScriptoriumResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ScriptoriumError::from(JsonError::new(format!(
            "Failed to read request {}: {}",
            path.display(),
            e
        )))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        ScriptoriumError::from(JsonError::new(format!(
            "Invalid request {}: {}",
            path.display(),
            e
        )))
    })
}

fn print_report(report: &PipelineReport) -> ScriptoriumResult<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| ScriptoriumError::from(JsonError::new(e.to_string())))?;
    println!("{}", json);
    Ok(())
}

/// Handle the `translate` command
pub async fn run_translation(app: &Scriptorium, path: &Path) -> ScriptoriumResult<()> {
    let request: TranslationRequest = read_request(path)?;
    tracing::info!(request = %path.display(), "Running translation");
    let report = app.translate(&request).await?;
    print_report(&report)
}

/// Handle the `story` command
pub async fn run_story(app: &Scriptorium, path: &Path) -> ScriptoriumResult<()> {
    let request: StoryRequest = read_request(path)?;
    tracing::info!(request = %path.display(), mode = %request.mode(), "Running story generation");
    let report = app.story(&request).await?;
    print_report(&report)
}
