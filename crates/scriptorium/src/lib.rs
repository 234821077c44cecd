//! Scriptorium: LLM batch translation and story generation for spreadsheets.
//!
//! Rows come in as a raw 2D grid, are grouped and sent to a generation
//! backend (OpenAI, Gemini or Anthropic), and the parsed results are merged
//! back into the destination sheet by key in a single write.
//!
//! # Architecture
//!
//! - `scriptorium_error` - Error types
//! - `scriptorium_core` - Rows, tables, grouping, batching, backend ids
//! - `scriptorium_interface` - `GenerationBackend`, `DestinationStore`, `PromptTemplateLoader`
//! - `scriptorium_models` - Provider adapters and the backend registry
//! - `scriptorium_storage` - Google Sheets and in-memory stores, prompt loader
//! - `scriptorium_pipeline` - Parsers, merge engine, translation and story pipelines
//! - `scriptorium_server` - HTTP routes
//!
//! This crate (`scriptorium`) re-exports everything and adds configuration
//! loading and the `scriptorium` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod config;

pub use app::Scriptorium;
pub use config::{
    PromptSettings, ScriptoriumConfig, ScriptoriumConfigBuilder, ServerSettings,
};

pub use scriptorium_core::*;
pub use scriptorium_error::*;
pub use scriptorium_interface::*;
pub use scriptorium_models::{
    AnthropicClient, BackendRegistry, GeminiClient, ModelSettings, ModelsConfig, OpenAiClient,
};
pub use scriptorium_pipeline::*;
pub use scriptorium_server::{AppState, ErrorResponse, create_router, serve};
pub use scriptorium_storage::{
    FilePromptLoader, InMemoryStore, SHEETS_TOKEN_VARIABLE, SheetsSettings, SheetsStore,
};
