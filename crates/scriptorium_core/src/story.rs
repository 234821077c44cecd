//! Typed view over dialogue rows.

use crate::{BackendId, KEY_COLUMN, Row};
use derive_getters::Getters;
use indexmap::IndexMap;
use scriptorium_error::BackendError;
use tracing::warn;

/// Columns the story pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryColumn {
    /// Scene identifier
    SceneId,
    /// Business key
    Key,
    /// Speaking character
    Speaker,
    /// Emotion cue
    Emotion,
    /// Relationship level used to pick a character profile
    Level,
    /// Stage direction
    Direction,
    /// Location name
    Location,
    /// Inner monologue (text or JSON object)
    InnerThought,
    /// Narration tone
    NarrationTone,
    /// Writing style
    WritingStyle,
    /// Introductory context
    IntroContext,
    /// Featured character for full scripts
    Character,
    /// Place for full scripts
    Place,
    /// System prompt variant for full scripts
    SystemKind,
    /// Backend discriminator
    Model,
    /// Sampling temperature
    Temperature,
}

/// Columns lifted into typed [`StoryRow`] fields (the key is typed on [`Row`] already).
const TYPED_COLUMNS: [StoryColumn; 15] = [
    StoryColumn::SceneId,
    StoryColumn::Speaker,
    StoryColumn::Emotion,
    StoryColumn::Level,
    StoryColumn::Direction,
    StoryColumn::Location,
    StoryColumn::InnerThought,
    StoryColumn::NarrationTone,
    StoryColumn::WritingStyle,
    StoryColumn::IntroContext,
    StoryColumn::Character,
    StoryColumn::Place,
    StoryColumn::SystemKind,
    StoryColumn::Model,
    StoryColumn::Temperature,
];

impl StoryColumn {
    /// Column name as it appears in sheet headers.
    pub fn name(self) -> &'static str {
        match self {
            Self::SceneId => "sceneId",
            Self::Key => KEY_COLUMN,
            Self::Speaker => "speaker",
            Self::Emotion => "emotion",
            Self::Level => "level",
            Self::Direction => "direction",
            Self::Location => "location",
            Self::InnerThought => "innerThought",
            Self::NarrationTone => "narrationTone",
            Self::WritingStyle => "writingStyle",
            Self::IntroContext => "introContext",
            Self::Character => "character",
            Self::Place => "place",
            Self::SystemKind => "systemKind",
            Self::Model => "model",
            Self::Temperature => "temperature",
        }
    }
}

/// A dialogue row with its known columns typed and the rest preserved.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{BackendId, Row, StoryRow};
///
/// let row = Row::new("s1_001")
///     .with_field("sceneId", "s1")
///     .with_field("speaker", "iroha")
///     .with_field("model", "Claude")
///     .with_field("temperature", "0.8")
///     .with_field("bgm", "rain");
/// let story = StoryRow::from_row(&row);
///
/// assert_eq!(story.scene_id(), "s1");
/// assert_eq!(story.backend().unwrap(), Some(BackendId::Claude));
/// assert_eq!(*story.temperature(), Some(0.8));
/// assert_eq!(story.extra().get("bgm").map(String::as_str), Some("rain"));
/// ```
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct StoryRow {
    scene_id: String,
    key: String,
    speaker: String,
    emotion: String,
    level: String,
    direction: String,
    location: String,
    inner_thought: String,
    narration_tone: String,
    writing_style: String,
    intro_context: String,
    character: String,
    place: String,
    system_kind: String,
    model: Option<String>,
    temperature: Option<f32>,
    extra: IndexMap<String, String>,
}

impl StoryRow {
    /// Build the typed view of a sheet row.
    ///
    /// A temperature cell that is not a number is logged and treated as unset,
    /// so the backend falls back to its default.
    pub fn from_row(row: &Row) -> Self {
        let text = |column: StoryColumn| row.value(column.name()).trim().to_string();

        let model = Some(text(StoryColumn::Model)).filter(|m| !m.is_empty());
        let raw_temperature = text(StoryColumn::Temperature);
        let temperature = if raw_temperature.is_empty() {
            None
        } else {
            match raw_temperature.parse::<f32>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(
                        key = row.key(),
                        temperature = %raw_temperature,
                        "Ignoring non-numeric temperature"
                    );
                    None
                }
            }
        };

        let extra = row
            .extensions()
            .iter()
            .filter(|(column, _)| !TYPED_COLUMNS.iter().any(|c| c.name() == column.as_str()))
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();

        Self {
            scene_id: text(StoryColumn::SceneId),
            key: row.key().trim().to_string(),
            speaker: text(StoryColumn::Speaker),
            emotion: text(StoryColumn::Emotion),
            level: text(StoryColumn::Level),
            direction: text(StoryColumn::Direction),
            location: text(StoryColumn::Location),
            inner_thought: text(StoryColumn::InnerThought),
            narration_tone: text(StoryColumn::NarrationTone),
            writing_style: text(StoryColumn::WritingStyle),
            intro_context: text(StoryColumn::IntroContext),
            character: text(StoryColumn::Character),
            place: text(StoryColumn::Place),
            system_kind: text(StoryColumn::SystemKind),
            model,
            temperature,
            extra,
        }
    }

    /// Backend requested by the row's `model` column, if any.
    ///
    /// # Errors
    ///
    /// Fails with an unsupported-backend error for unknown discriminators.
    pub fn backend(&self) -> Result<Option<BackendId>, BackendError> {
        BackendId::parse_optional(self.model.as_deref())
    }
}
