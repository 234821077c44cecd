use super::{AnthropicMessage, AnthropicRequest, AnthropicResponse};
use crate::http::{post_json, require_api_key};
use crate::{ModelSettings, sanitize_temperature};
use async_trait::async_trait;
use reqwest::Client;
use scriptorium_core::BackendId;
use scriptorium_error::{BackendError, BackendErrorKind, ScriptoriumResult};
use scriptorium_interface::GenerationBackend;
use tracing::{debug, instrument};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Creates a new Anthropic client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key
    /// * `settings` - Model identifier and output budget
    pub fn new(api_key: impl Into<String>, settings: &ModelSettings) -> Self {
        debug!(model = %settings.model(), "Creating new Anthropic client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: settings.model().clone(),
            max_tokens: *settings.max_tokens(),
        }
    }

    /// Creates a client from `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a missing-credentials error if the variable is unset or blank.
    pub fn from_env(settings: &ModelSettings) -> Result<Self, BackendError> {
        let variable = BackendId::Claude.credential_variable();
        let api_key = std::env::var(variable).unwrap_or_default();
        require_api_key("claude", variable, &api_key)?;
        Ok(Self::new(api_key, settings))
    }

    /// Sends a request to the Anthropic API.
    #[instrument(skip(self, request), fields(model = %request.model()))]
    pub async fn generate_anthropic(
        &self,
        request: &AnthropicRequest,
    ) -> Result<AnthropicResponse, BackendError> {
        let builder = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let response: AnthropicResponse = post_json("anthropic", builder, request).await?;
        debug!(response_id = %response.id(), stop_reason = ?response.stop_reason(), "Received response from Anthropic");
        Ok(response)
    }

    fn build_request(
        &self,
        input: &str,
        system_prompt: &str,
        temperature: f32,
    ) -> Result<AnthropicRequest, BackendError> {
        let message = AnthropicMessage::builder()
            .role("user")
            .content(input)
            .build()
            .map_err(|e| BackendError::new(BackendErrorKind::Builder(e.to_string())))?;

        AnthropicRequest::builder()
            .model(self.model.clone())
            .max_tokens(self.max_tokens)
            .system(system_prompt)
            .temperature(temperature)
            .messages(vec![message])
            .build()
            .map_err(|e| BackendError::new(BackendErrorKind::Builder(e.to_string())))
    }
}

#[async_trait]
impl GenerationBackend for AnthropicClient {
    #[instrument(skip(self, input, system_prompt), fields(provider = "anthropic", model = %self.model))]
    async fn generate(
        &self,
        input: &str,
        system_prompt: &str,
        temperature: Option<f32>,
    ) -> ScriptoriumResult<String> {
        require_api_key("claude", BackendId::Claude.credential_variable(), &self.api_key)?;
        let temperature = sanitize_temperature("claude", temperature, 0.0..=1.0);

        let request = self.build_request(input, system_prompt, temperature)?;
        let response = self.generate_anthropic(&request).await?;

        let text = response.text();
        if text.is_empty() {
            return Err(BackendError::new(BackendErrorKind::EmptyResponse("claude".into())).into());
        }
        Ok(text)
    }

    fn backend_id(&self) -> BackendId {
        BackendId::Claude
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
