//! Per-backend model settings.

use derive_getters::Getters;
use scriptorium_core::BackendId;
use serde::{Deserialize, Serialize};

/// Model identifier and output budget for one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ModelSettings {
    /// Provider model identifier
    model: String,
    /// Maximum output tokens per call
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
}

impl ModelSettings {
    /// Create settings for a model.
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
        }
    }
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_gpt() -> ModelSettings {
    ModelSettings::new("gpt-5.1", default_max_tokens())
}

fn default_gemini() -> ModelSettings {
    ModelSettings::new("gemini-2.5-flash", default_max_tokens())
}

fn default_claude() -> ModelSettings {
    ModelSettings::new("claude-opus-4-5-20251101", default_max_tokens())
}

/// Settings for every backend, keyed the way the `[models]` config table is.
///
/// ```toml
/// [models.claude]
/// model = "claude-opus-4-5-20251101"
/// max_tokens = 4096
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ModelsConfig {
    /// OpenAI settings
    #[serde(default = "default_gpt")]
    gpt: ModelSettings,
    /// Gemini settings
    #[serde(default = "default_gemini")]
    gemini: ModelSettings,
    /// Anthropic settings
    #[serde(default = "default_claude")]
    claude: ModelSettings,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            gpt: default_gpt(),
            gemini: default_gemini(),
            claude: default_claude(),
        }
    }
}

impl ModelsConfig {
    /// Settings for a backend.
    pub fn settings(&self, backend: BackendId) -> &ModelSettings {
        match backend {
            BackendId::Gpt => &self.gpt,
            BackendId::Gemini => &self.gemini,
            BackendId::Claude => &self.claude,
        }
    }
}
