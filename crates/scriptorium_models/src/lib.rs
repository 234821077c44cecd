//! Generation backend adapters for Scriptorium.
//!
//! Every provider is exposed through the same
//! [`GenerationBackend`](scriptorium_interface::GenerationBackend) capability:
//! `(input, system_prompt, temperature?) → text`.
//!
//! # Available Providers
//!
//! | Discriminator | Client              | Credential          |
//! |---------------|---------------------|---------------------|
//! | `gpt`         | [`OpenAiClient`]    | `OPENAI_API_KEY`    |
//! | `gemini`      | [`GeminiClient`]    | `GEMINI_API_KEY`    |
//! | `claude`      | [`AnthropicClient`] | `ANTHROPIC_API_KEY` |
//!
//! Clients are constructed once at process start and shared through a
//! [`BackendRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use scriptorium_core::BackendId;
//! use scriptorium_models::{BackendRegistry, ModelsConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = BackendRegistry::from_env(&ModelsConfig::default());
//! let backend = registry.select(BackendId::Claude)?;
//! let text = backend.generate("k1, label, Hello", "Translate to fr", None).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod anthropic;
mod gemini;
mod http;
mod openai;
mod registry;
mod settings;
mod temperature;

pub use anthropic::{
    AnthropicClient, AnthropicContentBlock, AnthropicMessage, AnthropicMessageBuilder,
    AnthropicRequest, AnthropicRequestBuilder, AnthropicResponse,
};
pub use gemini::{GeminiClient, GeminiContent, GeminiPart, GeminiRequest, GenerationConfig};
pub use openai::{ChatCompletionRequest, ChatMessage, OpenAiClient};
pub use registry::BackendRegistry;
pub use settings::{ModelSettings, ModelsConfig};
pub use temperature::{DEFAULT_TEMPERATURE, sanitize_temperature};
