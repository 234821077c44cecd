//! End-to-end runs through the facade with in-process collaborators.

use async_trait::async_trait;
use scriptorium::{
    BackendId, BackendRegistry, Destination, GenerationBackend, GenerationMode, InMemoryStore,
    PromptTemplateLoader, Row, Scriptorium, ScriptoriumConfig, ScriptoriumResult, StoryRequest,
    Table, TranslationRequest,
};
use serde_json::json;
use std::sync::Arc;

/// Answers translation batches and story rows from the same stub.
struct EchoBackend;

#[async_trait]
impl GenerationBackend for EchoBackend {
    async fn generate(
        &self,
        input: &str,
        system_prompt: &str,
        _temperature: Option<f32>,
    ) -> ScriptoriumResult<String> {
        if system_prompt.starts_with("story") {
            return Ok("A new line.".to_string());
        }
        Ok(input
            .lines()
            .filter_map(|line| line.split(',').next())
            .map(|key| format!("{}, Bonjour", key))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn backend_id(&self) -> BackendId {
        BackendId::Gemini
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

struct NamedPrompts;

#[async_trait]
impl PromptTemplateLoader for NamedPrompts {
    async fn load(&self, name: &str, _fallback: Option<&str>) -> String {
        name.trim_end_matches(".txt").to_string()
    }
}

#[tokio::test]
async fn translation_and_story_share_one_sheet() {
    let store = InMemoryStore::new();
    let destination = Destination::new("doc", "Main");
    store
        .insert(
            destination.clone(),
            &Table::new(
                vec!["key".into(), "sceneId".into(), "speaker".into(), "text".into()],
                vec![
                    Row::new("s1_001")
                        .with_field("sceneId", "s1")
                        .with_field("speaker", "iroha")
                        .with_field("text", "Hello"),
                    Row::new("s1_002")
                        .with_field("sceneId", "s1")
                        .with_field("speaker", "mio")
                        .with_field("text", "Hi"),
                ],
            ),
        )
        .await;

    let app = Scriptorium::new(
        &ScriptoriumConfig::default(),
        BackendRegistry::new().with_backend(Arc::new(EchoBackend)),
        Arc::new(store.clone()),
        Arc::new(NamedPrompts),
    )
    .unwrap();

    let grid = json!([
        ["key", "sceneId", "speaker", "text"],
        ["s1_001", "s1", "iroha", "Hello"],
        ["s1_002", "s1", "mio", "Hi"]
    ]);
    let translation = TranslationRequest::new(
        grid.clone(),
        vec!["fr".into()],
        "doc",
        "Main",
        "translate.txt",
    );
    let story = StoryRequest::new(grid, "doc", "Main", "story.txt", GenerationMode::SingleLine);

    let (translated, told) = tokio::join!(app.translate(&translation), app.story(&story));
    assert_eq!(*translated.unwrap().count(), 2);
    assert_eq!(*told.unwrap().count(), 2);

    let table = store.table(&destination).await.unwrap();
    for row in table.rows() {
        assert_eq!(row.get("fr"), Some("Bonjour"));
        assert_eq!(row.get("result"), Some("A new line."));
        assert!(row.get("text").is_some());
    }
    assert_eq!(store.write_count(), 2);
}
