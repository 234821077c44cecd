//! Router tests driven through `tower::ServiceExt::oneshot`.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use scriptorium_core::{BackendId, Destination, Row, Table};
use scriptorium_error::{BackendError, BackendErrorKind, ScriptoriumResult};
use scriptorium_interface::{GenerationBackend, PromptTemplateLoader};
use scriptorium_models::BackendRegistry;
use scriptorium_pipeline::{DestinationLocks, PipelineConfig, StoryPipeline, TranslationPipeline};
use scriptorium_server::{AppState, create_router};
use scriptorium_storage::InMemoryStore;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Returns a fixed reply, or fails when none is set.
struct FixedBackend(Option<&'static str>);

#[async_trait]
impl GenerationBackend for FixedBackend {
    async fn generate(
        &self,
        _input: &str,
        _system_prompt: &str,
        _temperature: Option<f32>,
    ) -> ScriptoriumResult<String> {
        self.0.map(str::to_string).ok_or_else(|| {
            BackendError::new(BackendErrorKind::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
            .into()
        })
    }

    fn backend_id(&self) -> BackendId {
        BackendId::Gemini
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Every template is a one-liner.
struct InlinePrompts;

#[async_trait]
impl PromptTemplateLoader for InlinePrompts {
    async fn load(&self, _name: &str, _fallback: Option<&str>) -> String {
        "Translate to {{language_code}}".to_string()
    }
}

fn app(reply: Option<&'static str>, store: &InMemoryStore) -> Router {
    let registry = BackendRegistry::new().with_backend(Arc::new(FixedBackend(reply)));
    let prompts: Arc<dyn PromptTemplateLoader> = Arc::new(InlinePrompts);
    let locks = DestinationLocks::new();
    let translation = TranslationPipeline::new(
        registry.clone(),
        Arc::new(store.clone()),
        Arc::clone(&prompts),
        locks.clone(),
        PipelineConfig::default(),
    )
    .unwrap();
    let story = StoryPipeline::new(
        registry,
        Arc::new(store.clone()),
        prompts,
        locks,
        PipelineConfig::default(),
    )
    .unwrap();
    create_router(AppState::new(Arc::new(translation), Arc::new(story)))
}

async fn post(app: Router, uri: &str, body: String) -> (StatusCode, JsonValue) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn translate_body() -> JsonValue {
    json!({
        "data": [["key", "type", "text"], ["k1", "label", "Hello"], ["k2", "btn", "OK"]],
        "languages": ["fr"],
        "sheetId": "doc",
        "sheetName": "UI",
        "promptFile": "translate.txt"
    })
}

#[tokio::test]
async fn liveness_and_health() {
    let store = InMemoryStore::new();

    let response = app(None, &store)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&text[..], b"Scriptorium is running");

    let response = app(None, &store)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn batch_translate_reports_merged_results() {
    let store = InMemoryStore::new();
    let destination = Destination::new("doc", "UI");
    store
        .insert(
            destination.clone(),
            &Table::new(
                vec!["key".into(), "type".into(), "text".into()],
                vec![Row::new("k1"), Row::new("k2")],
            ),
        )
        .await;

    let (status, body) = post(
        app(Some("k1, Bonjour\nk2, OK"), &store),
        "/ai/batch-translate",
        translate_body().to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["count"], 2);
    assert_eq!(body["skippedLines"], 0);
    assert_eq!(body["results"][0], json!({"key": "k1", "fr": "Bonjour"}));
    let table = store.table(&destination).await.unwrap();
    assert_eq!(table.rows()[1].get("fr"), Some("OK"));
}

#[tokio::test]
async fn invalid_request_is_a_bad_request() {
    let store = InMemoryStore::new();
    let mut body = translate_body();
    body["languages"] = json!([]);

    let (status, body) = post(app(Some("k1, Bonjour"), &store), "/ai/batch-translate", body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
    assert!(body["error"].as_str().unwrap().contains("languages"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let store = InMemoryStore::new();
    let (status, body) = post(app(None, &store), "/ai/batch-translate", "{not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn backend_failure_is_a_bad_gateway() {
    let store = InMemoryStore::new();
    let (status, body) = post(app(None, &store), "/ai/batch-translate", translate_body().to_string()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("target 'fr'"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn story_failures_stay_in_the_report() {
    let store = InMemoryStore::new();
    let request = json!({
        "data": [["key", "sceneId", "speaker"], ["s1_001", "s1", "iroha"]],
        "sheetId": "doc",
        "sheetName": "Story",
        "promptFile": "story.txt",
        "mode": "single_line"
    });

    let (status, body) = post(app(None, &store), "/ai/story-generate", request.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["results"][0]["key"], "s1_001");
    assert!(body["results"][0]["failure"].is_string());
}

#[tokio::test]
async fn unknown_story_backend_is_a_bad_request() {
    let store = InMemoryStore::new();
    let request = json!({
        "data": [["key", "sceneId", "speaker"], ["s1_001", "s1", "iroha"]],
        "sheetId": "doc",
        "sheetName": "Story",
        "promptFile": "story.txt",
        "model": "llama"
    });

    let (status, _) = post(app(None, &store), "/ai/story-generate", request.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
