//! Process-wide set of configured generation backends.

use crate::{AnthropicClient, GeminiClient, ModelsConfig, OpenAiClient};
use scriptorium_core::BackendId;
use scriptorium_error::{BackendError, BackendErrorKind};
use scriptorium_interface::GenerationBackend;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Generation backends keyed by discriminator.
///
/// Built once at startup and shared by every request. A backend whose
/// credential is absent is simply not registered; selecting it later fails
/// with a missing-credentials error. Which backend a request falls back to
/// is the pipeline's `default_backend` setting, not the registry's concern.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<BackendId, Arc<dyn GenerationBackend>>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("configured", &self.configured())
            .finish()
    }
}

impl BackendRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.register(backend);
        self
    }

    /// Register a backend under its own discriminator, replacing any previous one.
    pub fn register(&mut self, backend: Arc<dyn GenerationBackend>) {
        self.backends.insert(backend.backend_id(), backend);
    }

    /// Register every backend whose credential is present in the environment.
    pub fn from_env(models: &ModelsConfig) -> Self {
        let mut registry = Self::new();

        match OpenAiClient::from_env(models.gpt()) {
            Ok(client) => registry.register(Arc::new(client)),
            Err(e) => warn!(error = %e.kind, "OpenAI backend not configured"),
        }
        match GeminiClient::from_env(models.gemini()) {
            Ok(client) => registry.register(Arc::new(client)),
            Err(e) => warn!(error = %e.kind, "Gemini backend not configured"),
        }
        match AnthropicClient::from_env(models.claude()) {
            Ok(client) => registry.register(Arc::new(client)),
            Err(e) => warn!(error = %e.kind, "Anthropic backend not configured"),
        }

        info!(configured = ?registry.configured(), "Backend registry ready");
        registry
    }

    /// Discriminators with a registered backend, in a stable order.
    pub fn configured(&self) -> Vec<BackendId> {
        let mut ids: Vec<BackendId> = self.backends.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Backend registered for `id`.
    ///
    /// # Errors
    ///
    /// Fails with a missing-credentials error when `id` is not registered.
    pub fn select(&self, id: BackendId) -> Result<Arc<dyn GenerationBackend>, BackendError> {
        self.backends.get(&id).cloned().ok_or_else(|| {
            BackendError::new(BackendErrorKind::MissingCredentials {
                backend: id.to_string(),
                variable: id.credential_variable().to_string(),
            })
        })
    }
}
