//! Sheet rows, tables and the raw grid parser.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// Column that carries a row's business identity.
pub const KEY_COLUMN: &str = "key";

/// One sheet row: a typed business key plus every other column in header order.
///
/// The key is `None` when the source header has no `key` column. Rows with a
/// blank key are still valid rows; they simply cannot be addressed by merges.
///
/// # Examples
///
/// ```
/// use scriptorium_core::Row;
///
/// let row = Row::new("title_main").with_field("en", "Start");
/// assert_eq!(row.get("key"), Some("title_main"));
/// assert_eq!(row.get("en"), Some("Start"));
/// assert_eq!(row.get("fr"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(flatten)]
    fields: IndexMap<String, String>,
}

impl Row {
    /// Create a row with the given key and no other columns.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            fields: IndexMap::new(),
        }
    }

    /// Create a row without a key column.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Builder-style column setter.
    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Raw key as stored, `""` when the row has no key column.
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or_default()
    }

    /// Trimmed key, or `None` when it is missing or blank.
    pub fn merge_key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Value of a column; `key` resolves to the typed key.
    pub fn get(&self, column: &str) -> Option<&str> {
        if column == KEY_COLUMN {
            return self.key.as_deref();
        }
        self.fields.get(column).map(String::as_str)
    }

    /// Value of a column, `""` when absent.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or_default()
    }

    /// Set a column value; `key` sets the typed key.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        if column == KEY_COLUMN {
            self.key = Some(value.into());
        } else {
            self.fields.insert(column, value.into());
        }
    }

    /// Whether the row has the given column.
    pub fn has_column(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Column names carried by this row, key first.
    pub fn column_names(&self) -> Vec<&str> {
        self.key
            .as_ref()
            .map(|_| KEY_COLUMN)
            .into_iter()
            .chain(self.fields.keys().map(String::as_str))
            .collect()
    }

    /// Columns other than the key, in insertion order.
    pub fn extensions(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// Whether every cell of the row is blank.
    pub fn is_blank(&self) -> bool {
        self.key().trim().is_empty() && self.fields.values().all(|v| v.trim().is_empty())
    }
}

/// A header plus the rows that share it.
///
/// This is the unit destination stores read and write. Writes are positional:
/// the header is kept exactly as read, repeated or blank names included, and
/// every column maps to its own row field. The first column with a given
/// non-blank name is addressed by that name; blank and repeated columns get a
/// positional alias (`#<column number>`) so their cells round-trip untouched.
///
/// # Examples
///
/// ```
/// use scriptorium_core::Table;
///
/// let grid = vec![
///     vec!["key".to_string(), "memo".into(), "en".into(), "memo".into()],
///     vec!["k1".to_string(), "a".into(), "Hello".into(), "b".into()],
/// ];
/// let table = Table::from_grid(&grid);
///
/// assert_eq!(table.rows()[0].get("memo"), Some("a"));
/// assert_eq!(table.rows()[0].get("#4"), Some("b"));
/// assert_eq!(table.to_grid(), grid);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    header: Vec<String>,
    fields: Vec<String>,
    rows: Vec<Row>,
}

/// Row field backing each header column.
fn field_names(header: &[String]) -> Vec<String> {
    let taken: HashSet<&str> = header.iter().map(|h| h.trim()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut fields = Vec::with_capacity(header.len());
    for (index, name) in header.iter().enumerate() {
        let name = name.trim();
        if !name.is_empty() && seen.insert(name) {
            fields.push(name.to_string());
            continue;
        }
        let mut alias = format!("#{}", index + 1);
        while taken.contains(alias.as_str()) || fields.contains(&alias) {
            alias.insert(0, '#');
        }
        fields.push(alias);
    }
    fields
}

impl Table {
    /// Create a table from a header and rows.
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Self {
        let fields = field_names(&header);
        Self {
            header,
            fields,
            rows,
        }
    }

    /// Build a table from a string grid whose first line is the header.
    ///
    /// Unlike [`parse_rows`], a header-only grid yields an empty table that
    /// still knows its columns.
    pub fn from_grid(grid: &[Vec<String>]) -> Self {
        let Some((header_line, data)) = grid.split_first() else {
            return Self::default();
        };
        let header: Vec<String> = header_line.iter().map(|h| h.trim().to_string()).collect();
        let fields = field_names(&header);
        let rows = data.iter().map(|cells| row_from_cells(&fields, cells)).collect();
        Self {
            header,
            fields,
            rows,
        }
    }

    /// Render the table as a string grid, header line first.
    ///
    /// Columns a row lacks render as `""`.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.header.clone());
        for row in &self.rows {
            grid.push(
                self.fields
                    .iter()
                    .map(|field| row.value(field).to_string())
                    .collect(),
            );
        }
        grid
    }

    /// Append a column to the header unless a column already answers to that name.
    pub fn ensure_column(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.fields.contains(&column) {
            self.header.push(column);
            self.fields = field_names(&self.header);
        }
    }

    /// Ordered column names as they appear in the sheet.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Row field behind each header column, in header order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Data rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consume the table, keeping only its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Consume the table into header and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.header, self.rows)
    }
}

fn row_from_cells(fields: &[String], cells: &[String]) -> Row {
    let mut row = Row::blank();
    for (index, column) in fields.iter().enumerate() {
        let value = cells.get(index).cloned().unwrap_or_default();
        row.set(column.clone(), value);
    }
    row
}

/// Render one JSON cell as sheet text.
///
/// Strings pass through, `null` becomes `""`, everything else uses its JSON form.
pub fn cell_to_string(cell: &JsonValue) -> String {
    match cell {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_grid(raw: &JsonValue) -> Option<Vec<Vec<String>>> {
    let lines = raw.as_array()?;
    Some(
        lines
            .iter()
            .map(|line| match line {
                JsonValue::Array(cells) => cells.iter().map(cell_to_string).collect(),
                _ => Vec::new(),
            })
            .collect(),
    )
}

/// Parse a raw 2D JSON grid into a [`Table`].
///
/// Returns an empty table when `raw` is not an array or has fewer than two lines.
pub fn parse_table(raw: &JsonValue) -> Table {
    match json_grid(raw) {
        Some(grid) if grid.len() >= 2 => Table::from_grid(&grid),
        _ => Table::default(),
    }
}

/// Parse a raw 2D JSON grid (header line + data lines) into rows.
///
/// Header names are trimmed and missing cells default to `""`. Returns an
/// empty vector, never an error, when the input is unusable.
///
/// # Examples
///
/// ```
/// use scriptorium_core::parse_rows;
/// use serde_json::json;
///
/// let rows = parse_rows(&json!([[" key ", "text"], ["k1", "Hello"], ["k2"]]));
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].get("text"), Some("Hello"));
/// assert_eq!(rows[1].get("text"), Some(""));
///
/// assert!(parse_rows(&json!({"not": "a grid"})).is_empty());
/// assert!(parse_rows(&json!([["key"]])).is_empty());
/// ```
pub fn parse_rows(raw: &JsonValue) -> Vec<Row> {
    parse_table(raw).into_rows()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_non_string_cells() {
        let rows = parse_rows(&json!([["key", "level", "flag", "note"], ["k1", 3, true, null]]));
        assert_eq!(rows[0].get("level"), Some("3"));
        assert_eq!(rows[0].get("flag"), Some("true"));
        assert_eq!(rows[0].get("note"), Some(""));
    }

    #[test]
    fn header_only_grid_keeps_columns() {
        let table = Table::from_grid(&[vec!["key".into(), "en".into()]]);
        assert!(table.is_empty());
        assert_eq!(table.header(), ["key", "en"]);
    }

    #[test]
    fn to_grid_fills_missing_columns() {
        let mut table = Table::new(vec!["key".into(), "en".into()], vec![Row::new("k1")]);
        table.ensure_column("fr");
        assert_eq!(
            table.to_grid(),
            vec![
                vec!["key".to_string(), "en".to_string(), "fr".to_string()],
                vec!["k1".to_string(), String::new(), String::new()],
            ]
        );
    }

    #[test]
    fn repeated_and_blank_columns_stay_positional() {
        let grid: Vec<Vec<String>> = vec![
            vec!["key".into(), "".into(), "memo".into(), "".into(), "memo".into()],
            vec!["k1".into(), "x".into(), "a".into(), "y".into(), "b".into()],
        ];
        let mut table = Table::from_grid(&grid);
        assert_eq!(table.fields(), ["key", "#2", "memo", "#4", "#5"]);

        table.ensure_column("memo");
        table.ensure_column("fr");
        let out = table.to_grid();
        assert_eq!(out[0], ["key", "", "memo", "", "memo", "fr"]);
        assert_eq!(out[1], ["k1", "x", "a", "y", "b", ""]);
    }

    #[test]
    fn alias_avoids_real_column_names() {
        let header: Vec<String> = vec!["a".into(), "#2".into(), "a".into()];
        assert_eq!(field_names(&header), ["a", "#2", "#3"]);
        let header: Vec<String> = vec!["#2".into(), "".into()];
        assert_eq!(field_names(&header), ["#2", "##2"]);
    }

    #[test]
    fn merge_key_ignores_whitespace() {
        assert_eq!(Row::new("  k1 ").merge_key(), Some("k1"));
        assert_eq!(Row::new("   ").merge_key(), None);
        assert_eq!(Row::blank().merge_key(), None);
    }
}
