//! Trait definitions for the collaborators the Scriptorium engine drives.
//!
//! The pipelines only ever talk to the outside world through these traits:
//! generation backends, the destination sheet store, and prompt template
//! loading. Concrete implementations live in `scriptorium_models` and
//! `scriptorium_storage`; tests supply their own.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{DestinationStore, GenerationBackend, PromptTemplateLoader};
