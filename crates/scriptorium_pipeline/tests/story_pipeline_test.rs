//! Story pipeline tests: ordering, history, sentinels and write-back.

use async_trait::async_trait;
use scriptorium_core::{BackendId, Destination, GenerationMode, Row, Table};
use scriptorium_error::{BackendError, BackendErrorKind, ScriptoriumResult};
use scriptorium_interface::{GenerationBackend, PromptTemplateLoader};
use scriptorium_models::BackendRegistry;
use scriptorium_pipeline::{
    CONVERSATION_START, DestinationLocks, PipelineConfig, StoryPipeline, StoryRequest,
};
use scriptorium_storage::{FilePromptLoader, InMemoryStore};
use serde_json::{Value as JsonValue, json};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One recorded backend call.
#[derive(Debug, Clone)]
struct Call {
    system_prompt: String,
    history: Vec<String>,
}

type Responder = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Backend that answers by system prompt and records the history it was shown.
struct StoryBackend {
    responder: Responder,
    calls: Mutex<Vec<Call>>,
}

impl StoryBackend {
    fn new(responder: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose system prompt starts with `prefix`, in call order.
    fn calls_for(&self, prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.system_prompt.starts_with(prefix))
            .collect()
    }
}

/// History lines embedded in the user message.
fn history_of(input: &str) -> Vec<String> {
    let story = input
        .split_once("Story so far:\n")
        .and_then(|(_, rest)| rest.split_once("\n\nNow,"))
        .map(|(story, _)| story)
        .unwrap_or_default();
    if story == CONVERSATION_START {
        Vec::new()
    } else {
        story.lines().map(str::to_string).collect()
    }
}

#[async_trait]
impl GenerationBackend for StoryBackend {
    async fn generate(
        &self,
        input: &str,
        system_prompt: &str,
        _temperature: Option<f32>,
    ) -> ScriptoriumResult<String> {
        self.calls.lock().unwrap().push(Call {
            system_prompt: system_prompt.to_string(),
            history: history_of(input),
        });
        (self.responder)(system_prompt).ok_or_else(|| {
            BackendError::new(BackendErrorKind::EmptyResponse("story".to_string())).into()
        })
    }

    fn backend_id(&self) -> BackendId {
        BackendId::Gemini
    }

    fn model_name(&self) -> &str {
        "story-stub"
    }
}

struct Fixture {
    _prompts_dir: TempDir,
    store: InMemoryStore,
    pipeline: StoryPipeline,
}

fn fixture(backend: Arc<StoryBackend>) -> Fixture {
    fixture_with(backend, PipelineConfig::default())
}

fn pipe_delimited() -> PipelineConfig {
    PipelineConfig::builder().script_delimiter('|').build().unwrap()
}

fn fixture_with(backend: Arc<StoryBackend>, config: PipelineConfig) -> Fixture {
    let prompts_dir = TempDir::new().unwrap();
    std::fs::write(
        prompts_dir.path().join("single.txt"),
        "{{scene_id}}/{{key}} as {{speaker}}\n{{oshiz_dictionary}}",
    )
    .unwrap();
    std::fs::write(prompts_dir.path().join("script.txt"), "{{scene_id}} script").unwrap();
    let prompts: Arc<dyn PromptTemplateLoader> = Arc::new(FilePromptLoader::new(prompts_dir.path()));

    let store = InMemoryStore::new();
    let registry = BackendRegistry::new().with_backend(backend);
    let pipeline = StoryPipeline::new(
        registry,
        Arc::new(store.clone()),
        prompts,
        DestinationLocks::new(),
        config,
    )
    .unwrap();

    Fixture {
        _prompts_dir: prompts_dir,
        store,
        pipeline,
    }
}

fn destination() -> Destination {
    Destination::new("doc", "Story")
}

fn dialogue_grid() -> JsonValue {
    json!([
        ["key", "sceneId", "speaker", "direction", "model"],
        ["s1_001", "s1", "iroha", "greets", ""],
        ["s1_002", "s1", "mio", "answers", ""],
        ["s2_001", "s2", "narration", "opens", ""],
        ["s1_003", "s1", "iroha", "leaves", ""],
        ["s2_002", "s2", "player", "replies", ""]
    ])
}

fn dialogue_sheet() -> Table {
    Table::new(
        vec!["key".into(), "sceneId".into(), "speaker".into()],
        ["s1_001", "s1_002", "s2_001", "s1_003", "s2_002"]
            .into_iter()
            .map(|key| Row::new(key).with_field("sceneId", &key[..2]))
            .collect(),
    )
}

/// Answers "line for <key>" using the key the template puts after the scene.
fn line_for_key(system_prompt: &str) -> Option<String> {
    let key = system_prompt.split_whitespace().next()?.split('/').nth(1)?;
    Some(format!("{}, line for {}", key, key))
}

#[tokio::test]
async fn single_line_history_grows_within_each_scene() {
    let backend = StoryBackend::new(line_for_key);
    let fx = fixture(backend.clone());
    fx.store.insert(destination(), &dialogue_sheet()).await;

    let request = StoryRequest::new(
        dialogue_grid(),
        "doc",
        "Story",
        "single.txt",
        GenerationMode::SingleLine,
    );
    let report = fx.pipeline.run(&request).await.unwrap();

    assert_eq!(*report.count(), 5);
    assert_eq!(report.failures().count(), 0);

    let scene_one = backend.calls_for("s1/");
    let lengths: Vec<usize> = scene_one.iter().map(|c| c.history.len()).collect();
    assert_eq!(lengths, [0, 1, 2]);
    assert_eq!(
        scene_one[2].history,
        ["iroha: line for s1_001", "mio: line for s1_002"]
    );

    let scene_two = backend.calls_for("s2/");
    assert_eq!(scene_two.len(), 2);
    assert!(scene_two[0].history.is_empty());
    assert_eq!(scene_two[1].history, ["narration: line for s2_001"]);

    let table = fx.store.table(&destination()).await.unwrap();
    assert!(
        table
            .rows()
            .iter()
            .all(|row| row.get("result") == Some(format!("line for {}", row.key()).as_str()))
    );
    assert_eq!(fx.store.write_count(), 1);
}

#[tokio::test]
async fn failed_rows_become_sentinels_and_stay_out_of_history() {
    let backend = StoryBackend::new(|system_prompt| {
        if system_prompt.starts_with("s1/s1_002") {
            None
        } else {
            line_for_key(system_prompt)
        }
    });
    let fx = fixture(backend.clone());
    fx.store.insert(destination(), &dialogue_sheet()).await;

    let request = StoryRequest::new(
        json!([
            ["key", "sceneId", "speaker", "direction", "model"],
            ["s1_001", "s1", "iroha", "greets", ""],
            ["s1_002", "s1", "mio", "answers", ""],
            ["s1_003", "s1", "iroha", "waves", "llama"],
            ["s1_004", "s1", "mio", "leaves", ""]
        ]),
        "doc",
        "Story",
        "single.txt",
        GenerationMode::SingleLine,
    );
    let report = fx.pipeline.run(&request).await.unwrap();

    let failed: Vec<&str> = report.failures().map(|r| r.key().as_str()).collect();
    assert_eq!(failed, ["s1_002", "s1_003"]);
    assert_eq!(*report.count(), 2);

    // s1_003 fails selection before any backend call.
    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    let lengths: Vec<usize> = calls.iter().map(|c| c.history.len()).collect();
    assert_eq!(lengths, [0, 1, 1]);

    let table = fx.store.table(&destination()).await.unwrap();
    let result = |key: &str| {
        table
            .rows()
            .iter()
            .find(|r| r.key() == key)
            .map(|r| r.value("result").to_string())
    };
    assert_eq!(result("s1_001").as_deref(), Some("line for s1_001"));
    assert_eq!(result("s1_002").as_deref(), Some(""));
    assert_eq!(result("s1_003").as_deref(), Some(""));
    assert_eq!(report.missing_keys(), &["s1_004".to_string()]);
}

#[tokio::test]
async fn dictionary_reaches_the_system_prompt() {
    let backend = StoryBackend::new(line_for_key);
    let fx = fixture(backend.clone());

    let request = StoryRequest::new(
        json!([["key", "sceneId", "speaker"], ["s1_001", "s1", "iroha"]]),
        "doc",
        "Story",
        "single.txt",
        GenerationMode::SingleLine,
    )
    .with_dictionary([("Oshiz".to_string(), "the academy".to_string())].into_iter().collect());
    fx.pipeline.run(&request).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].system_prompt,
        "s1/s1_001 as Name: iroha\nOshiz : the academy"
    );
}

#[tokio::test]
async fn full_script_replaces_only_scenes_that_produced_rows() {
    let backend = StoryBackend::new(|system_prompt| {
        system_prompt
            .starts_with("s1 ")
            .then(|| "s1|1|iroha|happy|Morning!\ns1|2|mio|calm|Hi, Iroha.\nnot a script line".to_string())
    });
    let fx = fixture_with(backend.clone(), pipe_delimited());

    let header: Vec<String> = ["key", "sceneId", "seq", "speaker", "emotion", "text"]
        .into_iter()
        .map(String::from)
        .collect();
    let old = |key: &str, scene: &str| {
        Row::new(key)
            .with_field("sceneId", scene)
            .with_field("text", "old")
    };
    fx.store
        .insert(
            destination(),
            &Table::new(
                header.clone(),
                vec![
                    old("s1_001", "s1"),
                    old("s1_002", "s1"),
                    old("s1_003", "s1"),
                    old("s2_001", "s2"),
                ],
            ),
        )
        .await;

    let request = StoryRequest::new(
        json!([
            ["key", "sceneId", "character", "place", "direction", "model"],
            ["plan_s1", "s1", "iroha", "classroom", "morning greeting", ""],
            ["plan_s2", "s2", "mio", "rooftop", "confession", "llama"]
        ]),
        "doc",
        "Story",
        "script.txt",
        GenerationMode::FullScript,
    );
    let report = fx.pipeline.run(&request).await.unwrap();

    assert_eq!(*report.count(), 2);
    assert_eq!(*report.skipped_lines(), 1);
    let failed: Vec<&str> = report.failures().map(|r| r.key().as_str()).collect();
    assert_eq!(failed, ["plan_s2"]);

    let table = fx.store.table(&destination()).await.unwrap();
    assert_eq!(table.header(), header.as_slice());
    let rows: Vec<(&str, &str)> = table
        .rows()
        .iter()
        .map(|r| (r.key(), r.value("text")))
        .collect();
    assert_eq!(
        rows,
        [("s2_001", "old"), ("s1_001", "Morning!"), ("s1_002", "Hi, Iroha.")]
    );
    assert_eq!(table.rows()[2].get("speaker"), Some("mio"));
    assert_eq!(fx.store.write_count(), 1);
}

#[tokio::test]
async fn full_script_history_carries_across_rows_of_a_scene() {
    let backend = StoryBackend::new(|_| Some("s1|1|iroha|happy|Morning!".to_string()));
    let fx = fixture_with(backend.clone(), pipe_delimited());

    let request = StoryRequest::new(
        json!([
            ["key", "sceneId", "direction"],
            ["plan_a", "s1", "greeting"],
            ["plan_b", "s1", "farewell"]
        ]),
        "doc",
        "Story",
        "script.txt",
        GenerationMode::FullScript,
    );
    fx.pipeline.run(&request).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].history.is_empty());
    assert_eq!(calls[1].history, ["iroha: Morning!"]);
}

#[tokio::test]
async fn comma_scripts_keep_pipes_in_their_lines() {
    let backend = StoryBackend::new(|_| Some("s1, 1, iroha, torn, Yes | no | maybe".to_string()));
    let fx = fixture(backend);

    let request = StoryRequest::new(
        json!([["key", "sceneId", "direction"], ["plan_a", "s1", "indecision"]]),
        "doc",
        "Story",
        "script.txt",
        GenerationMode::FullScript,
    );
    let report = fx.pipeline.run(&request).await.unwrap();

    assert_eq!(*report.skipped_lines(), 0);
    let table = fx.store.table(&destination()).await.unwrap();
    assert_eq!(table.rows()[0].key(), "s1_001");
    assert_eq!(table.rows()[0].get("text"), Some("Yes | no | maybe"));
}

#[tokio::test]
async fn story_requests_require_a_prompt_file() {
    let backend = StoryBackend::new(line_for_key);
    let fx = fixture(backend.clone());

    let request = StoryRequest::new(
        dialogue_grid(),
        "doc",
        "Story",
        "  ",
        GenerationMode::SingleLine,
    );
    let err = fx.pipeline.run(&request).await.unwrap_err();

    assert!(err.is_validation());
    assert!(backend.calls().is_empty());
    assert_eq!(fx.store.write_count(), 0);
}
