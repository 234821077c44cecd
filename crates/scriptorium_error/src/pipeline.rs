//! Orchestration error types.

/// Specific error conditions raised while orchestrating a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A generation task failed; the whole request is aborted
    #[display(
        "Generation failed for group '{}', batch {}, target '{}': {}",
        group,
        batch,
        target,
        message
    )]
    TaskFailed {
        /// Group key of the failing task
        group: String,
        /// Zero-based batch index within the group
        batch: usize,
        /// Target language (or mode) of the failing task
        target: String,
        /// Underlying failure
        message: String,
    },
    /// A spawned group task panicked or was cancelled
    #[display("Group task '{}' did not complete: {}", group, message)]
    GroupJoin {
        /// Group key of the task
        group: String,
        /// Join failure description
        message: String,
    },
    /// Pipeline configuration is unusable
    #[display("Invalid pipeline configuration: {}", _0)]
    Configuration(String),
}

/// Pipeline error with location tracking.
///
/// # Examples
///
/// ```
/// use scriptorium_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::TaskFailed {
///     group: "default".into(),
///     batch: 0,
///     target: "fr".into(),
///     message: "timeout".into(),
/// });
/// assert!(format!("{}", err).contains("target 'fr'"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
