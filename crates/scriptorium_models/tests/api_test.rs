//! Live provider calls. Run with `--features api` and credentials in `.env`.

use scriptorium_core::BackendId;
use scriptorium_interface::GenerationBackend;
use scriptorium_models::{AnthropicClient, GeminiClient, ModelsConfig, OpenAiClient};

const SYSTEM_PROMPT: &str = "Translate the text after the second comma into French. \
Answer with exactly one line in the form: key, type, translation";

async fn assert_translates(backend: &dyn GenerationBackend) {
    let text = backend
        .generate("k1, label, Hello", SYSTEM_PROMPT, Some(0.2))
        .await
        .expect("generation succeeds");
    assert!(text.contains("k1"), "unexpected answer: {}", text);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn openai_translates_one_line() {
    let _ = dotenvy::dotenv();
    let models = ModelsConfig::default();
    let client = OpenAiClient::from_env(models.settings(BackendId::Gpt)).expect("OPENAI_API_KEY");
    assert_translates(&client).await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn gemini_translates_one_line() {
    let _ = dotenvy::dotenv();
    let models = ModelsConfig::default();
    let client =
        GeminiClient::from_env(models.settings(BackendId::Gemini)).expect("GEMINI_API_KEY");
    assert_translates(&client).await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn anthropic_translates_one_line() {
    let _ = dotenvy::dotenv();
    let models = ModelsConfig::default();
    let client = AnthropicClient::from_env(models.settings(BackendId::Claude))
        .expect("ANTHROPIC_API_KEY");
    assert_translates(&client).await;
}
