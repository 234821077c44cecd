//! Backend discriminators and story generation modes.

use scriptorium_error::{BackendError, BackendErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which generation provider handles a task.
///
/// Parsed from the `"gpt" | "gemini" | "claude"` discriminators used in
/// requests and sheet columns, case-insensitively.
///
/// # Examples
///
/// ```
/// use scriptorium_core::BackendId;
///
/// assert_eq!(BackendId::parse(" Claude ").unwrap(), BackendId::Claude);
/// assert!(BackendId::parse("llama").is_err());
/// assert_eq!(BackendId::Gpt.to_string(), "gpt");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// OpenAI
    Gpt,
    /// Google Gemini
    Gemini,
    /// Anthropic Claude
    Claude,
}

impl BackendId {
    /// Parse a discriminator, failing with an explicit unsupported-backend error.
    #[track_caller]
    pub fn parse(discriminator: &str) -> Result<Self, BackendError> {
        let trimmed = discriminator.trim();
        Self::from_str(trimmed).map_err(|_| {
            BackendError::new(BackendErrorKind::UnsupportedBackend(trimmed.to_string()))
        })
    }

    /// Parse an optional discriminator; blank counts as absent.
    #[track_caller]
    pub fn parse_optional(discriminator: Option<&str>) -> Result<Option<Self>, BackendError> {
        match discriminator.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::parse(value).map(Some),
        }
    }

    /// Environment variable holding this backend's API key.
    pub fn credential_variable(self) -> &'static str {
        match self {
            Self::Gpt => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

/// Output shape of sequential story generation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// One input row produces exactly one line
    #[default]
    SingleLine,
    /// One input row may expand into a multi-line script
    FullScript,
}

impl GenerationMode {
    /// Number of prior lines shown to the model by default.
    pub fn default_history_window(self) -> usize {
        match self {
            Self::SingleLine => 20,
            Self::FullScript => 15,
        }
    }
}
