//! Request and report payloads of the two pipelines.

use derive_getters::Getters;
use indexmap::IndexMap;
use scriptorium_core::{GenerationMode, ResultRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Batch translation request.
///
/// Field names follow the spreadsheet add-on that posts these requests;
/// the descriptive names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    /// Raw 2D grid, header line first
    #[serde(rename = "data", alias = "rows", default)]
    rows: JsonValue,
    /// Target language codes
    #[serde(rename = "languages", alias = "targetLanguages", default)]
    target_languages: Vec<String>,
    /// Spreadsheet identifier
    #[serde(rename = "sheetId", alias = "destinationId", default)]
    destination_id: String,
    /// Sheet (tab) name
    #[serde(rename = "sheetName", alias = "collectionName", default)]
    collection_name: String,
    /// Prompt template file name
    #[serde(default)]
    prompt_file: String,
    /// Grouping discriminator (`"character"` or a column name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grouping_hint: Option<String>,
    /// Backend discriminator
    #[serde(rename = "model", alias = "backend", default, skip_serializing_if = "Option::is_none")]
    backend: Option<String>,
}

impl TranslationRequest {
    /// Request with every required field.
    pub fn new(
        rows: JsonValue,
        target_languages: Vec<String>,
        destination_id: impl Into<String>,
        collection_name: impl Into<String>,
        prompt_file: impl Into<String>,
    ) -> Self {
        Self {
            rows,
            target_languages,
            destination_id: destination_id.into(),
            collection_name: collection_name.into(),
            prompt_file: prompt_file.into(),
            grouping_hint: None,
            backend: None,
        }
    }

    /// Set the grouping hint.
    pub fn with_grouping_hint(mut self, hint: impl Into<String>) -> Self {
        self.grouping_hint = Some(hint.into());
        self
    }

    /// Set the backend discriminator.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }
}

/// Sequential story generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    /// Raw 2D grid, header line first
    #[serde(rename = "data", alias = "rows", default)]
    rows: JsonValue,
    /// Spreadsheet identifier
    #[serde(rename = "sheetId", alias = "destinationId", default)]
    destination_id: String,
    /// Sheet (tab) name
    #[serde(rename = "sheetName", alias = "collectionName", default)]
    collection_name: String,
    /// Main prompt template file name
    #[serde(default)]
    prompt_file: String,
    /// Output shape
    #[serde(default)]
    mode: GenerationMode,
    /// Glossary rendered into `{{oshiz_dictionary}}`
    #[serde(default)]
    dictionary: IndexMap<String, String>,
    /// Grouping column (scenes by default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grouping_hint: Option<String>,
    /// Backend discriminator for rows that name none
    #[serde(rename = "model", alias = "backend", default, skip_serializing_if = "Option::is_none")]
    backend: Option<String>,
}

impl StoryRequest {
    /// Request with every required field.
    pub fn new(
        rows: JsonValue,
        destination_id: impl Into<String>,
        collection_name: impl Into<String>,
        prompt_file: impl Into<String>,
        mode: GenerationMode,
    ) -> Self {
        Self {
            rows,
            destination_id: destination_id.into(),
            collection_name: collection_name.into(),
            prompt_file: prompt_file.into(),
            mode,
            dictionary: IndexMap::new(),
            grouping_hint: None,
            backend: None,
        }
    }

    /// Set the glossary.
    pub fn with_dictionary(mut self, dictionary: IndexMap<String, String>) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Set the grouping column.
    pub fn with_grouping_hint(mut self, hint: impl Into<String>) -> Self {
        self.grouping_hint = Some(hint.into());
        self
    }

    /// Set the default backend discriminator.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    /// Always `"OK"` for completed runs
    status: String,
    /// Number of successful result records
    count: usize,
    /// Every record produced, failure sentinels included
    results: Vec<ResultRecord>,
    /// Backend output lines that could not be parsed
    skipped_lines: usize,
    /// Result keys absent from the destination
    missing_keys: Vec<String>,
}

impl PipelineReport {
    pub(crate) fn completed(
        results: Vec<ResultRecord>,
        skipped_lines: usize,
        missing_keys: Vec<String>,
    ) -> Self {
        Self {
            status: "OK".to_string(),
            count: results.iter().filter(|r| !r.is_failure()).count(),
            results,
            skipped_lines,
            missing_keys,
        }
    }

    /// Failure sentinels among the results.
    pub fn failures(&self) -> impl Iterator<Item = &ResultRecord> {
        self.results.iter().filter(|r| r.is_failure())
    }
}
