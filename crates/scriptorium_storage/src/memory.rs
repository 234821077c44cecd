//! Process-local destination store.

use async_trait::async_trait;
use scriptorium_core::{Destination, Table};
use scriptorium_error::{ScriptoriumResult, StoreError, StoreErrorKind};
use scriptorium_interface::DestinationStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// In-memory store with sheet-like write semantics.
///
/// A write overwrites whole lines starting at `start_row` and leaves lines
/// below the written range untouched. Trailing blank lines are dropped, the
/// way a sheet omits them from reads. Unknown destinations read as empty.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<HashMap<Destination, Vec<Vec<String>>>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a destination with a table.
    pub async fn insert(&self, destination: Destination, table: &Table) {
        self.tables.lock().await.insert(destination, table.to_grid());
    }

    /// Current table of a destination, if it was ever seeded or written.
    pub async fn table(&self, destination: &Destination) -> Option<Table> {
        self.tables
            .lock()
            .await
            .get(destination)
            .map(|grid| Table::from_grid(grid))
    }

    /// Number of successful writes across all destinations.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DestinationStore for InMemoryStore {
    #[instrument(skip(self), fields(destination = %destination))]
    async fn read(&self, destination: &Destination) -> ScriptoriumResult<Table> {
        let table = self.table(destination).await.unwrap_or_default();
        debug!(rows = table.len(), "Read destination");
        Ok(table)
    }

    #[instrument(skip(self, table), fields(destination = %destination, rows = table.len()))]
    async fn write(
        &self,
        destination: &Destination,
        start_row: usize,
        table: &Table,
    ) -> ScriptoriumResult<()> {
        if start_row == 0 {
            return Err(StoreError::new(StoreErrorKind::InvalidDestination(
                "start row is 1-based".to_string(),
            ))
            .into());
        }

        let mut tables = self.tables.lock().await;
        let grid = tables.entry(destination.clone()).or_default();
        for (offset, line) in table.to_grid().into_iter().enumerate() {
            let index = start_row - 1 + offset;
            if index >= grid.len() {
                grid.resize(index + 1, Vec::new());
            }
            grid[index] = line;
        }
        while grid
            .last()
            .is_some_and(|line| line.iter().all(|cell| cell.trim().is_empty()))
        {
            grid.pop();
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(lines = grid.len(), "Wrote destination");
        Ok(())
    }
}
