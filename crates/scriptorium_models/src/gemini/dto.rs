use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One part of a content turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct GeminiPart {
    /// Text payload. Providers occasionally return non-string values here.
    #[serde(default)]
    text: JsonValue,
}

impl GeminiPart {
    /// Text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: JsonValue::String(text.into()),
        }
    }

    /// The part's text, coercing non-string payloads to their JSON form.
    pub fn as_text(&self) -> String {
        match &self.text {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// A content turn (or the system instruction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct GeminiContent {
    /// Role of the turn; absent for system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    /// Parts of the turn
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    /// User turn with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![GeminiPart::from_text(text)],
        }
    }

    /// System instruction with a single text part.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![GeminiPart::from_text(text)],
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

impl GenerationConfig {
    /// Create sampling parameters.
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
        }
    }
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

impl GeminiRequest {
    /// System instruction plus a single user turn.
    pub fn new(system_prompt: &str, input: &str, generation_config: GenerationConfig) -> Self {
        Self {
            system_instruction: GeminiContent::instruction(system_prompt),
            contents: vec![GeminiContent::user(input)],
            generation_config,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Joined text of the first candidate.
    pub(crate) fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text = content
            .parts()
            .iter()
            .map(GeminiPart::as_text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
