use super::ChatCompletionRequest;
use super::dto::ChatCompletionResponse;
use crate::http::{post_json, require_api_key};
use crate::{ModelSettings, sanitize_temperature};
use async_trait::async_trait;
use reqwest::Client;
use scriptorium_core::BackendId;
use scriptorium_error::{BackendError, BackendErrorKind, ScriptoriumResult};
use scriptorium_interface::GenerationBackend;
use tracing::{debug, instrument};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI chat completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Creates a new OpenAI client.
    pub fn new(api_key: impl Into<String>, settings: &ModelSettings) -> Self {
        debug!(model = %settings.model(), "Creating new OpenAI client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: settings.model().clone(),
            max_tokens: *settings.max_tokens(),
        }
    }

    /// Creates a client from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a missing-credentials error if the variable is unset or blank.
    pub fn from_env(settings: &ModelSettings) -> Result<Self, BackendError> {
        let variable = BackendId::Gpt.credential_variable();
        let api_key = std::env::var(variable).unwrap_or_default();
        require_api_key("gpt", variable, &api_key)?;
        Ok(Self::new(api_key, settings))
    }
}

#[async_trait]
impl GenerationBackend for OpenAiClient {
    #[instrument(skip(self, input, system_prompt), fields(provider = "openai", model = %self.model))]
    async fn generate(
        &self,
        input: &str,
        system_prompt: &str,
        temperature: Option<f32>,
    ) -> ScriptoriumResult<String> {
        require_api_key("gpt", BackendId::Gpt.credential_variable(), &self.api_key)?;
        let temperature = sanitize_temperature("gpt", temperature, 0.0..=2.0);

        let request = ChatCompletionRequest::new(
            self.model.clone(),
            system_prompt,
            input,
            temperature,
            self.max_tokens,
        );
        let builder = self.client.post(OPENAI_API_URL).bearer_auth(&self.api_key);
        let response: ChatCompletionResponse = post_json("openai", builder, &request).await?;

        let text = response
            .text()
            .ok_or_else(|| BackendError::new(BackendErrorKind::EmptyResponse("gpt".into())))?;
        debug!(chars = text.len(), "OpenAI generation complete");
        Ok(text)
    }

    fn backend_id(&self) -> BackendId {
        BackendId::Gpt
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
