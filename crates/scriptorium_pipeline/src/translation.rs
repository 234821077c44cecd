//! Batch translation orchestration.

use crate::validate::{backend_discriminator, prompt_file, require_destination, require_languages, require_table};
use crate::{
    DestinationLocks, ParsedOutput, PipelineConfig, PipelineReport, TranslationParser,
    TranslationRequest, merge_in_place,
};
use futures::{StreamExt, TryStreamExt, stream};
use scriptorium_core::{Group, GroupingStrategy, ResultRecord, Row, split_batches};
use scriptorium_error::{PipelineError, PipelineErrorKind, ScriptoriumResult};
use scriptorium_interface::{DestinationStore, GenerationBackend, PromptTemplateLoader};
use scriptorium_models::BackendRegistry;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Placeholder replaced by each target language code.
const LANGUAGE_PLACEHOLDER: &str = "{{language_code}}";

/// One backend call: a batch of one group for one language.
#[derive(Debug, Clone)]
struct GenerationTask {
    group: String,
    batch: usize,
    language: String,
    input: String,
    system_prompt: String,
}

/// Prompt file for a special-case group: `<stem>_<value>.<ext>`.
fn group_prompt_name(prompt_file: &str, value: &str) -> String {
    let path = Path::new(prompt_file);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(extension)) => format!("{}_{}.{}", stem, value, extension),
        _ => format!("{}_{}", prompt_file, value),
    }
}

/// Batch translation pipeline.
///
/// Validate → parse → group → batch → generate (parallel over languages and
/// batches) → parse → read the destination once → merge in place → write once.
///
/// Any failed generation task aborts the request before the destination is
/// touched, so a request never leaves a partial write behind.
pub struct TranslationPipeline {
    backends: BackendRegistry,
    store: Arc<dyn DestinationStore>,
    prompts: Arc<dyn PromptTemplateLoader>,
    locks: DestinationLocks,
    config: PipelineConfig,
    parser: TranslationParser,
}

impl std::fmt::Debug for TranslationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationPipeline")
            .field("backends", &self.backends)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TranslationPipeline {
    /// Create a pipeline over injected collaborators.
    ///
    /// # Errors
    ///
    /// Fails when `config` does not validate.
    pub fn new(
        backends: BackendRegistry,
        store: Arc<dyn DestinationStore>,
        prompts: Arc<dyn PromptTemplateLoader>,
        locks: DestinationLocks,
        config: PipelineConfig,
    ) -> ScriptoriumResult<Self> {
        Ok(Self {
            backends,
            store,
            prompts,
            locks,
            config: config.checked()?,
            parser: TranslationParser::new()?,
        })
    }

    /// Run one translation request.
    ///
    /// # Errors
    ///
    /// - Validation errors before any external call
    /// - Backend selection errors (missing credentials)
    /// - A task failure naming its group, batch and language
    /// - Store errors from the snapshot read or the write
    #[instrument(
        skip(self, request),
        fields(
            destination = %request.destination_id(),
            collection = %request.collection_name(),
            languages = request.target_languages().len()
        )
    )]
    pub async fn run(&self, request: &TranslationRequest) -> ScriptoriumResult<PipelineReport> {
        let table = require_table(request.rows())?;
        let languages = require_languages(request.target_languages())?;
        let destination = require_destination(request.destination_id(), request.collection_name())?;
        let backend_id = backend_discriminator(request.backend().as_deref())?;
        prompt_file(request.prompt_file(), false)?;

        let backend = self
            .backends
            .select(backend_id.unwrap_or(*self.config.default_backend()))?;

        let strategy = GroupingStrategy::from_hint(request.grouping_hint().as_deref());
        let groups = strategy.partition(table.into_rows());
        info!(groups = groups.len(), backend = %backend.backend_id(), "Starting translation");

        let tasks = self
            .plan(&groups, &languages, request.prompt_file().trim())
            .await;
        let (records, skipped_lines) = self.generate(backend, tasks).await?;

        let _guard = self.locks.acquire(&destination).await;
        let snapshot = self.store.read(&destination).await?;
        let outcome = merge_in_place(&snapshot, &records);
        let missing_keys = outcome.missing_keys().clone();

        if outcome.has_changes() {
            let table = outcome.padded(snapshot.len());
            self.store.write(&destination, 1, &table).await?;
            info!(rows = table.len(), "Translation written back");
        } else {
            info!("Nothing to write back");
        }

        Ok(PipelineReport::completed(records, skipped_lines, missing_keys))
    }

    async fn system_prompt(&self, group: &Group, prompt_file: &str) -> String {
        if prompt_file.is_empty() {
            return String::new();
        }
        match group.discriminator() {
            Some(value) => {
                self.prompts
                    .load(&group_prompt_name(prompt_file, value), Some(prompt_file))
                    .await
            }
            None => self.prompts.load(prompt_file, None).await,
        }
    }

    fn input_line(&self, row: &Row) -> String {
        format!(
            "{}, {}, {}",
            row.key(),
            row.value("type"),
            row.value(self.config.source_column())
        )
    }

    /// Tasks in group, batch, language order.
    async fn plan(
        &self,
        groups: &[Group],
        languages: &[String],
        prompt_file: &str,
    ) -> Vec<GenerationTask> {
        let mut tasks = Vec::new();
        for group in groups {
            let template = self.system_prompt(group, prompt_file).await;
            if template.is_empty() && !prompt_file.is_empty() {
                warn!(group = %group.key(), prompt_file, "Prompt template is empty");
            }
            for (batch, rows) in split_batches(group.rows(), *self.config.batch_size())
                .into_iter()
                .enumerate()
            {
                let input = rows
                    .iter()
                    .map(|row| self.input_line(row))
                    .collect::<Vec<_>>()
                    .join("\n");
                for language in languages {
                    tasks.push(GenerationTask {
                        group: group.key().clone(),
                        batch,
                        language: language.clone(),
                        input: input.clone(),
                        system_prompt: template.replace(LANGUAGE_PLACEHOLDER, language),
                    });
                }
            }
        }
        debug!(tasks = tasks.len(), "Planned generation tasks");
        tasks
    }

    /// Run every task, at most `max_concurrency` at a time.
    ///
    /// Results come back in task order regardless of completion order.
    async fn generate(
        &self,
        backend: Arc<dyn GenerationBackend>,
        tasks: Vec<GenerationTask>,
    ) -> ScriptoriumResult<(Vec<ResultRecord>, usize)> {
        let parser = &self.parser;
        let mut outputs: Vec<(usize, ParsedOutput)> = stream::iter(tasks.into_iter().enumerate())
            .map(|(index, task)| {
                let backend = Arc::clone(&backend);
                async move {
                    let text = backend
                        .generate(&task.input, &task.system_prompt, None)
                        .await
                        .map_err(|e| {
                            warn!(
                                group = %task.group,
                                batch = task.batch,
                                language = %task.language,
                                error = %e,
                                "Generation task failed"
                            );
                            PipelineError::new(PipelineErrorKind::TaskFailed {
                                group: task.group.clone(),
                                batch: task.batch,
                                target: task.language.clone(),
                                message: e.to_string(),
                            })
                        })?;
                    debug!(group = %task.group, batch = task.batch, language = %task.language, raw = %text, "Backend output");
                    Ok::<_, PipelineError>((index, parser.parse(&text, &task.language)))
                }
            })
            .buffer_unordered(*self.config.max_concurrency())
            .try_collect()
            .await?;
        outputs.sort_by_key(|(index, _)| *index);

        let mut records = Vec::new();
        let mut skipped_lines = 0;
        for (_, output) in outputs {
            let (parsed, skipped) = output.into_parts();
            records.extend(parsed);
            skipped_lines += skipped;
        }
        if skipped_lines > 0 {
            warn!(skipped_lines, "Some backend output lines could not be parsed");
        }
        Ok((records, skipped_lines))
    }
}
