//! History-aware sequential story generation.

use crate::validate::{backend_discriminator, prompt_file, require_destination, require_table};
use crate::{
    DestinationLocks, HistoryWindow, PipelineConfig, PipelineReport, PromptEngine, StoryRequest,
    merge_in_place, merge_replace_by_group, parse_script, parse_single_line,
};
use scriptorium_core::{
    BackendId, GenerationMode, Group, GroupingStrategy, ResultRecord, Row, StoryColumn, StoryRow,
};
use scriptorium_error::{PipelineError, PipelineErrorKind, ScriptoriumResult};
use scriptorium_interface::{DestinationStore, PromptTemplateLoader};
use scriptorium_models::BackendRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// Everything a group loop needs, shared by all group tasks of a request.
struct GroupContext {
    backends: BackendRegistry,
    default_backend: BackendId,
    prompts: Arc<dyn PromptTemplateLoader>,
    engine: PromptEngine,
    mode: GenerationMode,
    window: usize,
    result_column: String,
    script_delimiter: char,
    strategy: GroupingStrategy,
}

/// What one group produced.
#[derive(Debug, Default)]
struct GroupOutcome {
    records: Vec<ResultRecord>,
    rows: Vec<Row>,
    skipped_lines: usize,
}

impl GroupContext {
    async fn generate(&self, story: &StoryRow, history: &HistoryWindow) -> ScriptoriumResult<String> {
        let backend_id = story.backend()?.unwrap_or(self.default_backend);
        let backend = self.backends.select(backend_id)?;

        let system_prompt = self
            .engine
            .build(story, history, self.mode, self.prompts.as_ref())
            .await;
        let input = PromptEngine::user_message(history, story.direction());
        let text = backend
            .generate(&input, &system_prompt, *story.temperature())
            .await?;
        debug!(key = %story.key(), backend = %backend_id, raw = %text, "Backend output");
        Ok(text)
    }

    /// Keep a generated row inside the group that produced it, so replacing
    /// the group later removes it again.
    fn pin_to_group(&self, mut row: Row, group_key: &str, source: &Row) -> Row {
        if let GroupingStrategy::ByField { column } = &self.strategy {
            if self.strategy.group_key(&row) != group_key {
                row.set(column.clone(), source.value(column));
            }
        }
        row
    }

    /// Rows strictly in order: row N+1 starts only once row N is in history.
    async fn run_group(&self, group: Group) -> GroupOutcome {
        let mut history = HistoryWindow::new(self.window);
        let mut outcome = GroupOutcome::default();

        for row in group.rows() {
            if row.is_blank() {
                continue;
            }
            let story = StoryRow::from_row(row);
            let text = match self.generate(&story, &history).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(key = %story.key(), error = %e, "Row generation failed");
                    outcome
                        .records
                        .push(ResultRecord::failed(story.key(), e.to_string()));
                    continue;
                }
            };

            match self.mode {
                GenerationMode::SingleLine => match parse_single_line(&text, story.key()) {
                    Ok(line) => {
                        history.push(format!("{}: {}", story.speaker(), line));
                        outcome.records.push(
                            ResultRecord::new(story.key()).with_field(&self.result_column, line),
                        );
                    }
                    Err(e) => {
                        warn!(key = %story.key(), error = %e, "Unusable single-line output");
                        outcome
                            .records
                            .push(ResultRecord::failed(story.key(), e.to_string()));
                    }
                },
                GenerationMode::FullScript => {
                    let (records, skipped) =
                        parse_script(&text, story.scene_id(), self.script_delimiter).into_parts();
                    outcome.skipped_lines += skipped;
                    if records.is_empty() {
                        warn!(key = %story.key(), skipped, "No script lines parsed");
                        outcome.records.push(ResultRecord::failed(
                            story.key(),
                            format!("no script lines parsed ({} skipped)", skipped),
                        ));
                        continue;
                    }
                    history.extend(records.iter().map(|r| {
                        format!(
                            "{}: {}",
                            r.field("speaker").unwrap_or_default(),
                            r.field("text").unwrap_or_default()
                        )
                    }));
                    outcome.rows.extend(
                        records
                            .iter()
                            .map(|r| self.pin_to_group(r.to_row(), group.key(), row)),
                    );
                    outcome.records.extend(records);
                }
            }
        }

        info!(
            rows = group.rows().len(),
            produced = outcome.records.iter().filter(|r| !r.is_failure()).count(),
            history = history.len(),
            "Group complete"
        );
        outcome
    }
}

/// Sequential story generation pipeline.
///
/// Rows of a group run strictly in order, each prompt seeing a bounded window
/// of the lines generated before it. Groups (scenes by default) run
/// concurrently, bounded by `max_concurrency`. A failing row becomes a
/// failure sentinel and the loop moves on.
///
/// Write-back happens once: single-line results merge in place into the
/// result column; full scripts replace every group that produced at least
/// one row.
pub struct StoryPipeline {
    backends: BackendRegistry,
    store: Arc<dyn DestinationStore>,
    prompts: Arc<dyn PromptTemplateLoader>,
    locks: DestinationLocks,
    config: PipelineConfig,
}

impl std::fmt::Debug for StoryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryPipeline")
            .field("backends", &self.backends)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StoryPipeline {
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
        })
    }

    fn strategy(hint: Option<&str>) -> GroupingStrategy {
        let column = hint
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(StoryColumn::SceneId.name());
        GroupingStrategy::ByField {
            column: column.to_string(),
        }
    }

    /// Run one story request.
    ///
    /// # Errors
    ///
    /// - Validation errors before any external call
    /// - A group task that panicked
    /// - Store errors from the snapshot read or the write
    ///
    /// Backend failures never fail the request; they surface as failure
    /// sentinels in the report.
    #[instrument(
        skip(self, request),
        fields(
            destination = %request.destination_id(),
            collection = %request.collection_name(),
            mode = %request.mode()
        )
    )]
    pub async fn run(&self, request: &StoryRequest) -> ScriptoriumResult<PipelineReport> {
        let table = require_table(request.rows())?;
        let destination = require_destination(request.destination_id(), request.collection_name())?;
        let request_backend = backend_discriminator(request.backend().as_deref())?;
        prompt_file(request.prompt_file(), true)?;

        let mode = *request.mode();
        let template = self.prompts.load(request.prompt_file().trim(), None).await;
        if template.is_empty() {
            warn!(prompt_file = %request.prompt_file(), "Story template is empty");
        }

        let strategy = Self::strategy(request.grouping_hint().as_deref());
        let context = Arc::new(GroupContext {
            backends: self.backends.clone(),
            default_backend: request_backend.unwrap_or(*self.config.default_backend()),
            prompts: Arc::clone(&self.prompts),
            engine: PromptEngine::new(template, request.dictionary())?,
            mode,
            window: self.config.history_window(mode),
            result_column: self.config.result_column().clone(),
            script_delimiter: *self.config.script_delimiter(),
            strategy: strategy.clone(),
        });

        let groups = strategy.partition(table.into_rows());
        info!(groups = groups.len(), "Starting story generation");

        let semaphore = Arc::new(Semaphore::new(*self.config.max_concurrency()));
        let mut handles = Vec::with_capacity(groups.len());
        for group in groups {
            let key = group.key().clone();
            let context = Arc::clone(&context);
            let semaphore = Arc::clone(&semaphore);
            let span = info_span!("story_group", group = %key);
            let handle = tokio::spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    context.run_group(group).await
                }
                .instrument(span),
            );
            handles.push((key, handle));
        }

        let mut touched = HashSet::new();
        let mut records = Vec::new();
        let mut new_rows = Vec::new();
        let mut skipped_lines = 0;
        let mut pending = handles.into_iter();
        while let Some((key, handle)) = pending.next() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    pending.by_ref().for_each(|(_, handle)| handle.abort());
                    return Err(PipelineError::new(PipelineErrorKind::GroupJoin {
                        group: key,
                        message: e.to_string(),
                    })
                    .into());
                }
            };
            if !outcome.rows.is_empty() {
                touched.insert(key);
            }
            records.extend(outcome.records);
            new_rows.extend(outcome.rows);
            skipped_lines += outcome.skipped_lines;
        }

        let failures = records.iter().filter(|r| r.is_failure()).count();
        if failures > 0 {
            warn!(failures, "Some rows failed to generate");
        }

        let _guard = self.locks.acquire(&destination).await;
        let snapshot = self.store.read(&destination).await?;
        let outcome = match mode {
            GenerationMode::SingleLine => merge_in_place(&snapshot, &records),
            GenerationMode::FullScript => {
                merge_replace_by_group(&snapshot, &new_rows, &strategy, &touched)
            }
        };
        let missing_keys = outcome.missing_keys().clone();

        if outcome.has_changes() {
            let table = outcome.padded(snapshot.len());
            self.store.write(&destination, 1, &table).await?;
            info!(rows = table.len(), groups = touched.len(), "Story written back");
        } else {
            info!("Nothing to write back");
        }

        Ok(PipelineReport::completed(records, skipped_lines, missing_keys))
    }
}
