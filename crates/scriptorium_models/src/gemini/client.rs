use super::dto::GeminiResponse;
use super::{GeminiRequest, GenerationConfig};
use crate::http::{post_json, require_api_key};
use crate::{ModelSettings, sanitize_temperature};
use async_trait::async_trait;
use reqwest::Client;
use scriptorium_core::BackendId;
use scriptorium_error::{BackendError, BackendErrorKind, ScriptoriumResult};
use scriptorium_interface::GenerationBackend;
use tracing::{debug, instrument};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    pub fn new(api_key: impl Into<String>, settings: &ModelSettings) -> Self {
        debug!(model = %settings.model(), "Creating new Gemini client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: settings.model().clone(),
            max_tokens: *settings.max_tokens(),
        }
    }

    /// Creates a client from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a missing-credentials error if the variable is unset or blank.
    pub fn from_env(settings: &ModelSettings) -> Result<Self, BackendError> {
        let variable = BackendId::Gemini.credential_variable();
        let api_key = std::env::var(variable).unwrap_or_default();
        require_api_key("gemini", variable, &api_key)?;
        Ok(Self::new(api_key, settings))
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    #[instrument(skip(self, input, system_prompt), fields(provider = "gemini", model = %self.model))]
    async fn generate(
        &self,
        input: &str,
        system_prompt: &str,
        temperature: Option<f32>,
    ) -> ScriptoriumResult<String> {
        require_api_key("gemini", BackendId::Gemini.credential_variable(), &self.api_key)?;
        let temperature = sanitize_temperature("gemini", temperature, 0.0..=2.0);

        let request = GeminiRequest::new(
            system_prompt,
            input,
            GenerationConfig::new(temperature, self.max_tokens),
        );
        let builder = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key);
        let response: GeminiResponse = post_json("gemini", builder, &request).await?;

        let text = response
            .text()
            .ok_or_else(|| BackendError::new(BackendErrorKind::EmptyResponse("gemini".into())))?;
        debug!(chars = text.len(), "Gemini generation complete");
        Ok(text)
    }

    fn backend_id(&self) -> BackendId {
        BackendId::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
