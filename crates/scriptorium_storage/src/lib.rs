//! Destination stores and prompt template loading for Scriptorium.
//!
//! Implementations of the `scriptorium_interface` collaborator traits:
//!
//! - [`SheetsStore`]: Google Sheets v4 `values` API, bearer-token auth
//! - [`InMemoryStore`]: a process-local store with sheet-like write semantics
//! - [`FilePromptLoader`]: prompt templates from a directory on disk
//!
//! # Example
//!
//! ```no_run
//! use scriptorium_core::Destination;
//! use scriptorium_interface::DestinationStore;
//! use scriptorium_storage::{SheetsSettings, SheetsStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SheetsStore::from_env(&SheetsSettings::default())?;
//! let table = store.read(&Destination::new("1AbC", "UI")).await?;
//! println!("{} rows", table.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod prompts;
mod sheets;

pub use memory::InMemoryStore;
pub use prompts::FilePromptLoader;
pub use sheets::{SHEETS_TOKEN_VARIABLE, SheetsSettings, SheetsStore};
