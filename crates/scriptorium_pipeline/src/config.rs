//! Pipeline tuning knobs.

use derive_builder::Builder;
use derive_getters::Getters;
use scriptorium_core::{BackendId, BatchSize, GenerationMode};
use scriptorium_error::{ConfigError, PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};

fn default_max_concurrency() -> usize {
    4
}

fn default_single_line_history() -> usize {
    GenerationMode::SingleLine.default_history_window()
}

fn default_full_script_history() -> usize {
    GenerationMode::FullScript.default_history_window()
}

fn default_result_column() -> String {
    "result".to_string()
}

fn default_source_column() -> String {
    "text".to_string()
}

fn default_backend() -> BackendId {
    BackendId::Gemini
}

fn default_script_delimiter() -> char {
    ','
}

/// `[pipeline]` configuration table.
///
/// # Examples
///
/// ```
/// use scriptorium_core::BatchSize;
/// use scriptorium_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .batch_size(BatchSize::new(50).unwrap())
///     .max_concurrency(2_usize)
///     .build()
///     .unwrap();
/// assert_eq!(config.batch_size().get(), 50);
/// assert_eq!(config.result_column(), "result");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate_concurrency"))]
pub struct PipelineConfig {
    /// Rows per translation batch
    #[serde(default)]
    #[builder(default)]
    batch_size: BatchSize,
    /// Generation calls in flight per request
    #[serde(default = "default_max_concurrency")]
    #[builder(default = "default_max_concurrency()")]
    max_concurrency: usize,
    /// Prior lines shown to the model in single-line mode
    #[serde(default = "default_single_line_history")]
    #[builder(default = "default_single_line_history()")]
    single_line_history: usize,
    /// Prior lines shown to the model in full-script mode
    #[serde(default = "default_full_script_history")]
    #[builder(default = "default_full_script_history()")]
    full_script_history: usize,
    /// Column single-line story results are written to
    #[serde(default = "default_result_column")]
    #[builder(default = "default_result_column()")]
    result_column: String,
    /// Column holding the text to translate
    #[serde(default = "default_source_column")]
    #[builder(default = "default_source_column()")]
    source_column: String,
    /// Backend used when a request or row names none
    #[serde(default = "default_backend")]
    #[builder(default = "default_backend()")]
    default_backend: BackendId,
    /// Field separator of full-script output lines
    #[serde(default = "default_script_delimiter")]
    #[builder(default = "default_script_delimiter()")]
    script_delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: BatchSize::default(),
            max_concurrency: default_max_concurrency(),
            single_line_history: default_single_line_history(),
            full_script_history: default_full_script_history(),
            result_column: default_result_column(),
            source_column: default_source_column(),
            default_backend: default_backend(),
            script_delimiter: default_script_delimiter(),
        }
    }
}

impl PipelineConfigBuilder {
    fn validate_concurrency(&self) -> Result<(), String> {
        match self.max_concurrency {
            Some(0) => Err("max_concurrency must be greater than zero".to_string()),
            _ => Ok(()),
        }
    }
}

impl PipelineConfig {
    /// Start building a configuration.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Check values serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Fails when `max_concurrency` is zero, a column name is blank, or the
    /// script delimiter is whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::new("max_concurrency must be greater than zero"));
        }
        if self.result_column.trim().is_empty() {
            return Err(ConfigError::new("result_column must not be empty"));
        }
        if self.source_column.trim().is_empty() {
            return Err(ConfigError::new("source_column must not be empty"));
        }
        if self.script_delimiter.is_whitespace() {
            return Err(ConfigError::new("script_delimiter must not be whitespace"));
        }
        Ok(())
    }

    /// History window for a generation mode.
    pub fn history_window(&self, mode: GenerationMode) -> usize {
        match mode {
            GenerationMode::SingleLine => self.single_line_history,
            GenerationMode::FullScript => self.full_script_history,
        }
    }

    pub(crate) fn checked(self) -> Result<Self, PipelineError> {
        self.validate()
            .map_err(|e| PipelineError::new(PipelineErrorKind::Configuration(e.message)))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_mode_windows() {
        let config = PipelineConfig::default();
        assert_eq!(config.history_window(GenerationMode::SingleLine), 20);
        assert_eq!(config.history_window(GenerationMode::FullScript), 15);
        assert_eq!(config.batch_size().get(), BatchSize::DEFAULT);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(PipelineConfig::builder().max_concurrency(0_usize).build().is_err());
    }

    #[test]
    fn deserializes_partial_table() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"batch_size": 50, "default_backend": "claude"}"#).unwrap();
        assert_eq!(config.batch_size().get(), 50);
        assert_eq!(*config.default_backend(), BackendId::Claude);
        assert_eq!(*config.max_concurrency(), 4);

        assert!(serde_json::from_str::<PipelineConfig>(r#"{"batch_size": 0}"#).is_err());
    }

    #[test]
    fn script_delimiter_is_configurable() {
        assert_eq!(*PipelineConfig::default().script_delimiter(), ',');

        let config: PipelineConfig = serde_json::from_str(r#"{"script_delimiter": "|"}"#).unwrap();
        assert_eq!(*config.script_delimiter(), '|');

        let tab = PipelineConfig::builder().script_delimiter('\t').build().unwrap();
        assert!(tab.validate().is_err());
    }
}
