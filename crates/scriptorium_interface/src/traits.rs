//! Collaborator traits.

use async_trait::async_trait;
use scriptorium_core::{BackendId, Destination, Table};
use scriptorium_error::ScriptoriumResult;

/// Uniform capability over one text generation provider.
///
/// Implementations must fail fast with a non-retryable error when their
/// credentials are missing, and must fall back to their default temperature
/// (with a warning) rather than fail when `temperature` is out of range.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for `input` under `system_prompt`.
    async fn generate(
        &self,
        input: &str,
        system_prompt: &str,
        temperature: Option<f32>,
    ) -> ScriptoriumResult<String>;

    /// Discriminator this backend answers to.
    fn backend_id(&self) -> BackendId;

    /// Model identifier (e.g., "claude-opus-4-5-20251101").
    fn model_name(&self) -> &str;
}

/// The spreadsheet the pipelines read from and write back to.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Read the full current table (header plus data rows) of a destination.
    async fn read(&self, destination: &Destination) -> ScriptoriumResult<Table>;

    /// Overwrite the destination starting at 1-based row `start_row`.
    ///
    /// The table's header line is written at `start_row`, its data rows below it.
    async fn write(
        &self,
        destination: &Destination,
        start_row: usize,
        table: &Table,
    ) -> ScriptoriumResult<()>;
}

/// Source of prompt templates.
#[async_trait]
pub trait PromptTemplateLoader: Send + Sync {
    /// Load `name`, else `fallback`, else return `""`.
    async fn load(&self, name: &str, fallback: Option<&str>) -> String;
}
