//! Process-wide wiring of collaborators and pipelines.

use crate::ScriptoriumConfig;
use scriptorium_error::ScriptoriumResult;
use scriptorium_interface::{DestinationStore, PromptTemplateLoader};
use scriptorium_models::BackendRegistry;
use scriptorium_pipeline::{
    DestinationLocks, PipelineReport, StoryPipeline, StoryRequest, TranslationPipeline,
    TranslationRequest,
};
use scriptorium_server::AppState;
use scriptorium_storage::{FilePromptLoader, SheetsStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Both pipelines over one set of collaborators.
///
/// The pipelines share a single [`DestinationLocks`], so a translation and a
/// story run against the same sheet never interleave their read-merge-write.
#[derive(Debug, Clone)]
pub struct Scriptorium {
    translation: Arc<TranslationPipeline>,
    story: Arc<StoryPipeline>,
}

impl Scriptorium {
    /// Wire explicit collaborators.
    ///
    /// # Errors
    ///
    /// Fails when the pipeline configuration is invalid.
    pub fn new(
        config: &ScriptoriumConfig,
        backends: BackendRegistry,
        store: Arc<dyn DestinationStore>,
        prompts: Arc<dyn PromptTemplateLoader>,
    ) -> ScriptoriumResult<Self> {
        let locks = DestinationLocks::new();
        let translation = TranslationPipeline::new(
            backends.clone(),
            Arc::clone(&store),
            Arc::clone(&prompts),
            locks.clone(),
            config.pipeline().clone(),
        )?;
        let story = StoryPipeline::new(
            backends,
            store,
            prompts,
            locks,
            config.pipeline().clone(),
        )?;
        Ok(Self {
            translation: Arc::new(translation),
            story: Arc::new(story),
        })
    }

    /// Wire production collaborators from configuration and environment.
    ///
    /// Backends without credentials are skipped; the Sheets token is required.
    ///
    /// # Errors
    ///
    /// Fails when `GOOGLE_SHEETS_ACCESS_TOKEN` is unset or the configuration is invalid.
    #[instrument(skip(config))]
    pub fn from_config(config: &ScriptoriumConfig) -> ScriptoriumResult<Self> {
        let backends = BackendRegistry::from_env(config.models());
        let store = SheetsStore::from_env(config.sheets())?;
        let prompts = FilePromptLoader::new(config.prompts().directory());
        info!(
            backends = ?backends.configured(),
            prompts = %config.prompts().directory().display(),
            "Collaborators ready"
        );
        Self::new(config, backends, Arc::new(store), Arc::new(prompts))
    }

    /// Run a translation request.
    ///
    /// # Errors
    ///
    /// See [`TranslationPipeline::run`].
    pub async fn translate(&self, request: &TranslationRequest) -> ScriptoriumResult<PipelineReport> {
        self.translation.run(request).await
    }

    /// Run a story request.
    ///
    /// # Errors
    ///
    /// See [`StoryPipeline::run`].
    pub async fn story(&self, request: &StoryRequest) -> ScriptoriumResult<PipelineReport> {
        self.story.run(request).await
    }

    /// HTTP state sharing these pipelines.
    pub fn app_state(&self) -> AppState {
        AppState::new(Arc::clone(&self.translation), Arc::clone(&self.story))
    }
}
