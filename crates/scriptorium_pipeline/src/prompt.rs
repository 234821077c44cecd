//! Story prompt assembly.

use crate::HistoryWindow;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use scriptorium_core::{GenerationMode, StoryRow};
use scriptorium_error::{PipelineError, PipelineErrorKind};
use scriptorium_interface::PromptTemplateLoader;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::trace;

/// Render a glossary as `term : meaning` lines.
///
/// ```
/// use indexmap::IndexMap;
/// use scriptorium_pipeline::render_dictionary;
///
/// let dictionary = IndexMap::from([
///     ("Oshiz".to_string(), "the idol agency".to_string()),
///     ("Iroha".to_string(), "lead idol".to_string()),
/// ]);
/// assert_eq!(render_dictionary(&dictionary), "Oshiz : the idol agency\nIroha : lead idol");
/// ```
pub fn render_dictionary(dictionary: &IndexMap<String, String>) -> String {
    dictionary
        .iter()
        .map(|(term, meaning)| format!("{} : {}", term, meaning))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fills `{{placeholder}}` slots of the main story template.
///
/// Unknown placeholders are left as they are.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    template: String,
    dictionary: String,
    placeholder: Regex,
}

impl PromptEngine {
    /// Engine for one request's template and glossary.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in placeholder pattern does not compile.
    pub fn new(
        template: impl Into<String>,
        dictionary: &IndexMap<String, String>,
    ) -> Result<Self, PipelineError> {
        let placeholder = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").map_err(|e| {
            PipelineError::new(PipelineErrorKind::Configuration(format!(
                "Invalid template regex: {}",
                e
            )))
        })?;
        Ok(Self {
            template: template.into(),
            dictionary: render_dictionary(dictionary),
            placeholder,
        })
    }

    /// System prompt for one row.
    pub async fn build(
        &self,
        row: &StoryRow,
        history: &HistoryWindow,
        mode: GenerationMode,
        loader: &dyn PromptTemplateLoader,
    ) -> String {
        let mut values: HashMap<&'static str, String> = HashMap::from([
            ("oshiz_dictionary", self.dictionary.clone()),
            ("scene_id", row.scene_id().clone()),
            ("key", row.key().clone()),
            ("Location", row.location().clone()),
            ("direction", row.direction().clone()),
            ("model", row.model().clone().unwrap_or_default()),
            (
                "temperature",
                row.temperature().map(|t| t.to_string()).unwrap_or_default(),
            ),
            ("innerThought", inner_thought(row.inner_thought())),
        ]);

        match mode {
            GenerationMode::SingleLine => {
                let intro = if row.intro_context().is_empty() {
                    row.direction()
                } else {
                    row.intro_context()
                };
                values.extend([
                    ("speaker", speaker_profile(row.speaker(), row.level(), loader).await),
                    ("conversation_history", history.render()),
                    ("emotion", row.emotion().clone()),
                    ("introContext", intro.clone()),
                    ("narrationTone", row.narration_tone().clone()),
                    ("writingStyle", row.writing_style().clone()),
                ]);
            }
            GenerationMode::FullScript => {
                let character = if row.character().is_empty() {
                    String::new()
                } else {
                    loader
                        .load(
                            &format!("story_character_{}_{}.txt", row.character(), row.level()),
                            None,
                        )
                        .await
                };
                let system = if row.system_kind().is_empty() {
                    String::new()
                } else {
                    loader
                        .load(&format!("story_system_{}.txt", row.system_kind()), None)
                        .await
                };
                let player = loader.load("story_character_player.txt", None).await;
                values.extend([
                    ("player_info", player),
                    ("character_info", character),
                    ("place", row.place().clone()),
                    ("systemKind", system),
                    ("script_history", history.render()),
                ]);
            }
        }

        trace!(key = %row.key(), ?mode, "Rendering story prompt");
        self.placeholder
            .replace_all(&self.template, |caps: &Captures| {
                values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Per-row input text: the recent history and the row's direction.
    pub fn user_message(history: &HistoryWindow, direction: &str) -> String {
        format!(
            "You are a story writer and an expert in visual novel scenarios.\n\n\
             Story so far:\n{}\n\n\
             Now, generate the next part of the story based on the following details:\n{}\n\n\
             Please provide the output in the specified format.",
            history.render(),
            direction
        )
    }
}

/// Inner thoughts may be plain text or a JSON object; objects are pretty-printed.
fn inner_thought(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "None".to_string();
    }
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Object(map)) if !map.is_empty() => {
            serde_json::to_string_pretty(&map).unwrap_or_else(|_| raw.to_string())
        }
        _ => raw.to_string(),
    }
}

async fn speaker_profile(speaker: &str, level: &str, loader: &dyn PromptTemplateLoader) -> String {
    if speaker.is_empty() {
        return String::new();
    }
    if !level.is_empty() {
        return loader
            .load(&format!("story_character_{}_{}.txt", speaker, level), None)
            .await;
    }
    match speaker {
        "player" => loader.load("story_character_player.txt", None).await,
        "narration" => loader.load("story_character_narration.txt", None).await,
        other => format!("Name: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scriptorium_core::Row;

    struct MapLoader(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl PromptTemplateLoader for MapLoader {
        async fn load(&self, name: &str, fallback: Option<&str>) -> String {
            self.0
                .get(name)
                .or_else(|| fallback.and_then(|f| self.0.get(f)))
                .map(|s| s.to_string())
                .unwrap_or_default()
        }
    }

    fn loader() -> MapLoader {
        MapLoader(HashMap::from([
            ("story_character_iroha_2.txt", "Iroha, level 2"),
            ("story_character_player.txt", "The player"),
            ("story_system_date.txt", "Date rules"),
        ]))
    }

    #[tokio::test]
    async fn single_line_prompt_fills_row_values() {
        let engine = PromptEngine::new(
            "[{{speaker}}] {{ emotion }} @ {{Location}} / {{conversation_history}} / {{innerThought}} / {{unknown}}",
            &IndexMap::new(),
        )
        .unwrap();
        let row = StoryRow::from_row(
            &Row::new("s1_001")
                .with_field("speaker", "iroha")
                .with_field("level", "2")
                .with_field("emotion", "shy")
                .with_field("location", "park"),
        );

        let prompt = engine
            .build(&row, &HistoryWindow::new(20), GenerationMode::SingleLine, &loader())
            .await;
        assert_eq!(
            prompt,
            "[Iroha, level 2] shy @ park / (conversation start) / None / {{unknown}}"
        );
    }

    #[tokio::test]
    async fn full_script_prompt_loads_profiles() {
        let engine = PromptEngine::new(
            "{{player_info}}|{{character_info}}|{{systemKind}}|{{script_history}}",
            &IndexMap::new(),
        )
        .unwrap();
        let row = StoryRow::from_row(
            &Row::new("s1")
                .with_field("character", "iroha")
                .with_field("level", "2")
                .with_field("systemKind", "date"),
        );
        let mut history = HistoryWindow::new(15);
        history.push("iroha: Hi");

        let prompt = engine
            .build(&row, &history, GenerationMode::FullScript, &loader())
            .await;
        assert_eq!(prompt, "The player|Iroha, level 2|Date rules|iroha: Hi");
    }

    #[test]
    fn inner_thought_objects_are_pretty_printed() {
        assert_eq!(inner_thought(""), "None");
        assert_eq!(inner_thought("nervous"), "nervous");
        assert_eq!(inner_thought("{}"), "{}");
        assert_eq!(inner_thought(r#"{"mood":"calm"}"#), "{\n  \"mood\": \"calm\"\n}");
    }

    #[tokio::test]
    async fn unknown_speaker_without_level_is_named() {
        assert_eq!(speaker_profile("mio", "", &loader()).await, "Name: mio");
        assert_eq!(speaker_profile("player", "", &loader()).await, "The player");
        assert_eq!(speaker_profile("", "3", &loader()).await, "");
    }
}
