//! Error types for the Scriptorium library.
//!
//! This crate provides the foundation error types used throughout the Scriptorium workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! The kinds map onto how a request reacts to them:
//!
//! | Error              | Effect on a request                                      |
//! |--------------------|----------------------------------------------------------|
//! | [`ValidationError`] | rejected before any external call                        |
//! | [`BackendError`]    | aborts batch pipelines, sentinel row in story pipelines  |
//! | [`StoreError`]      | fatal, nothing is written                                |
//! | [`PipelineError`]   | a fan-out task failed, carries the failing group/language |
//!
//! # Examples
//!
//! ```
//! use scriptorium_error::{ScriptoriumResult, ValidationError, ValidationErrorKind};
//!
//! fn check_languages(languages: &[String]) -> ScriptoriumResult<()> {
//!     if languages.is_empty() {
//!         Err(ValidationError::new(ValidationErrorKind::EmptyList("languages".into())))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_languages(&[]).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod http;
mod json;
mod pipeline;
mod store;
mod validation;

pub use backend::{BackendError, BackendErrorKind};
pub use config::ConfigError;
pub use error::{ScriptoriumError, ScriptoriumErrorKind, ScriptoriumResult};
pub use http::HttpError;
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use store::{StoreError, StoreErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
