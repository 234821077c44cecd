//! Reconciling generated results with the destination snapshot.
//!
//! Both merges are pure and deterministic: the snapshot is the base, results
//! go on top, and merging the same results twice gives the same table as
//! merging them once.

use derive_getters::Getters;
use scriptorium_core::{GroupingStrategy, KEY_COLUMN, ResultRecord, Row, Table};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Table to write back plus what the merge did.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MergeOutcome {
    /// Merged table
    table: Table,
    /// Cells whose value changed
    changed_cells: usize,
    /// Snapshot rows removed by group replacement
    removed_rows: usize,
    /// Rows appended after the preserved snapshot rows
    appended_rows: usize,
    /// Result keys with no row in the snapshot, first-seen order
    missing_keys: Vec<String>,
}

impl MergeOutcome {
    /// Whether writing the table would change the destination.
    pub fn has_changes(&self) -> bool {
        self.changed_cells > 0 || self.removed_rows > 0 || self.appended_rows > 0
    }

    /// The merged table, padded with blank rows up to `min_rows` data rows.
    ///
    /// Writing the padded table over a sheet that held `min_rows` rows
    /// clears every stale row in the same write.
    pub fn padded(self, min_rows: usize) -> Table {
        let (header, mut rows) = self.table.into_parts();
        if rows.len() < min_rows {
            rows.resize_with(min_rows, Row::blank);
        }
        Table::new(header, rows)
    }

    /// Consume into the merged table.
    pub fn into_table(self) -> Table {
        self.table
    }
}

fn append_column(header: &mut Vec<String>, column: &str) {
    if !header.iter().any(|c| c == column) {
        header.push(column.to_string());
    }
}

/// Overwrite targeted fields of existing rows, matched by trimmed key.
///
/// Only non-empty values are written, so a failed or blank translation never
/// erases existing text. Rows without a usable key pass through in place.
/// When several snapshot rows share a key, all of them are updated. Result
/// keys absent from the snapshot are reported in
/// [`missing_keys`](MergeOutcome::missing_keys) and otherwise ignored, as are
/// failure sentinels.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{ResultRecord, Row, Table};
/// use scriptorium_pipeline::merge_in_place;
///
/// let snapshot = Table::new(
///     vec!["key".into(), "en".into()],
///     vec![Row::new("k1").with_field("en", "Hello")],
/// );
/// let outcome = merge_in_place(
///     &snapshot,
///     &[
///         ResultRecord::new("k1").with_field("fr", "Bonjour"),
///         ResultRecord::new("k9").with_field("fr", "Neuf"),
///     ],
/// );
///
/// assert_eq!(outcome.table().header(), ["key", "en", "fr"]);
/// assert_eq!(outcome.table().rows()[0].get("fr"), Some("Bonjour"));
/// assert_eq!(outcome.missing_keys(), &["k9".to_string()]);
/// ```
pub fn merge_in_place(snapshot: &Table, updates: &[ResultRecord]) -> MergeOutcome {
    let (mut header, mut rows) = snapshot.clone().into_parts();

    let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        if let Some(key) = row.merge_key() {
            positions.entry(key.to_string()).or_default().push(index);
        }
    }

    let mut changed_cells = 0;
    let mut missing_keys: Vec<String> = Vec::new();

    for record in updates.iter().filter(|r| !r.is_failure()) {
        let key = record.key().trim();
        let Some(targets) = positions.get(key) else {
            if !key.is_empty() && !missing_keys.iter().any(|k| k == key) {
                warn!(key, "Result key not found in destination");
                missing_keys.push(key.to_string());
            }
            continue;
        };

        for (column, value) in record.fields() {
            if column == KEY_COLUMN || value.trim().is_empty() {
                continue;
            }
            append_column(&mut header, column);
            for &index in targets {
                if rows[index].get(column) != Some(value.as_str()) {
                    rows[index].set(column.clone(), value.clone());
                    changed_cells += 1;
                }
            }
        }
    }

    debug!(changed_cells, missing = missing_keys.len(), "Merged results in place");
    MergeOutcome {
        table: Table::new(header, rows),
        changed_cells,
        removed_rows: 0,
        appended_rows: 0,
        missing_keys,
    }
}

/// Replace whole groups of the snapshot with newly generated rows.
///
/// Every keyed snapshot row whose group (under `strategy`, the same
/// discriminator used for generation) is in `touched` is removed; all other
/// rows keep their order. `new_rows` are appended after them in order.
/// Columns the new rows introduce are appended to the header.
pub fn merge_replace_by_group(
    snapshot: &Table,
    new_rows: &[Row],
    strategy: &GroupingStrategy,
    touched: &HashSet<String>,
) -> MergeOutcome {
    let (mut header, rows) = snapshot.clone().into_parts();

    let mut kept = Vec::with_capacity(rows.len() + new_rows.len());
    let mut removed_rows = 0;
    for row in rows {
        if row.merge_key().is_some() && touched.contains(&strategy.group_key(&row)) {
            removed_rows += 1;
        } else {
            kept.push(row);
        }
    }

    for row in new_rows {
        for column in row.column_names() {
            append_column(&mut header, column);
        }
        kept.push(row.clone());
    }

    debug!(
        removed_rows,
        appended_rows = new_rows.len(),
        groups = touched.len(),
        "Merged results by group"
    );
    MergeOutcome {
        table: Table::new(header, kept),
        changed_cells: 0,
        removed_rows,
        appended_rows: new_rows.len(),
        missing_keys: Vec::new(),
    }
}
