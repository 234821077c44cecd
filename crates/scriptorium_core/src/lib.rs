//! Core data types for the Scriptorium sheet generation engine.
//!
//! This crate holds the pure, synchronous building blocks every pipeline shares:
//!
//! - [`Row`] and [`Table`]: keyed sheet rows with an ordered extension map
//! - [`parse_rows`] / [`parse_table`]: raw 2D JSON grids into rows
//! - [`GroupingStrategy`]: partitioning rows into [`Group`]s
//! - [`split_batches`]: bounded, order-preserving chunking
//! - [`ResultRecord`]: one parsed generation result
//! - [`StoryRow`]: typed view over dialogue rows

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod batch;
mod destination;
mod grouping;
mod names;
mod record;
mod row;
mod story;
mod telemetry;

pub use backend::{BackendId, GenerationMode};
pub use batch::{BatchSize, split_batches};
pub use destination::Destination;
pub use grouping::{DEFAULT_GROUP, Group, GroupingStrategy};
pub use names::is_plain_file_name;
pub use record::ResultRecord;
pub use row::{KEY_COLUMN, Row, Table, cell_to_string, parse_rows, parse_table};
pub use story::{StoryColumn, StoryRow};
pub use telemetry::{init_telemetry, shutdown_telemetry};
