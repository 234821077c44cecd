//! HTTP surface for the Scriptorium pipelines.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | liveness text |
//! | `GET /health` | `{"status": "ok"}` |
//! | `POST /ai/batch-translate` | [`TranslationPipeline`](scriptorium_pipeline::TranslationPipeline) |
//! | `POST /ai/story-generate` | [`StoryPipeline`](scriptorium_pipeline::StoryPipeline) |
//!
//! Successful runs answer with the pipeline report. Failures answer with an
//! [`ErrorResponse`]: 400 for invalid requests, 502 when a backend failed,
//! 500 for everything else.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod response;

pub use api::{AppState, create_router, serve};
pub use response::{ApiError, ErrorResponse, status_for};
