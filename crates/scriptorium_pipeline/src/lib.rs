//! Orchestration engine for Scriptorium.
//!
//! Two pipelines share one set of building blocks:
//!
//! - [`TranslationPipeline`]: parse → group → batch → generate in parallel over
//!   languages and batches → parse → read the destination once → merge → write once.
//! - [`StoryPipeline`]: one strictly sequential, history-aware loop per group,
//!   groups running concurrently, followed by the same single read-merge-write.
//!
//! Both hold a per-destination lock ([`DestinationLocks`]) from snapshot read to
//! write, and a request either writes once or not at all.
//!
//! The pure pieces are usable on their own:
//!
//! - [`TranslationParser`], [`parse_script`], [`parse_single_line`]: backend text → records
//! - [`merge_in_place`], [`merge_replace_by_group`]: records + snapshot → rows to write
//! - [`PromptEngine`], [`HistoryWindow`]: story prompt assembly

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod history;
mod locks;
mod merge;
mod parser;
mod prompt;
mod request;
mod story;
mod translation;
mod validate;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use history::{CONVERSATION_START, HistoryWindow};
pub use locks::DestinationLocks;
pub use merge::{MergeOutcome, merge_in_place, merge_replace_by_group};
pub use parser::{
    ParsedOutput, TranslationParser, coerce_payload, parse_script, parse_single_line,
};
pub use prompt::{PromptEngine, render_dictionary};
pub use request::{PipelineReport, StoryRequest, TranslationRequest};
pub use story::StoryPipeline;
pub use translation::TranslationPipeline;
