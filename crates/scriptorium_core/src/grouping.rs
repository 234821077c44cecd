//! Partitioning rows into generation groups.

use crate::Row;
use derive_getters::Getters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Group key for every row that no special case claims.
pub const DEFAULT_GROUP: &str = "default";

/// Sentinel row type that marks character dialogue in translation sheets.
const CHARACTER_DIALOG_TYPE: &str = "characterDialog";

/// Rows that share one prompt template and backend choice.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Group {
    /// Group key (`"default"` or a namespaced discriminator value)
    key: String,
    /// Member rows in input order
    rows: Vec<Row>,
}

impl Group {
    /// Create a group.
    pub fn new(key: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            key: key.into(),
            rows,
        }
    }

    /// Whether this is the catch-all group.
    pub fn is_default(&self) -> bool {
        self.key == DEFAULT_GROUP
    }

    /// Discriminator value of a namespaced group (`"character:iroha"` → `"iroha"`).
    pub fn discriminator(&self) -> Option<&str> {
        self.key.split_once(':').map(|(_, value)| value)
    }

    /// Consume the group into its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

/// How rows are assigned to groups.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{GroupingStrategy, Row};
///
/// let strategy = GroupingStrategy::from_hint(Some("character"));
/// let dialog = Row::new("k1")
///     .with_field("type", "characterDialog")
///     .with_field("character", " Iroha ");
/// let label = Row::new("k2").with_field("type", "label");
///
/// assert_eq!(strategy.group_key(&dialog), "character:iroha");
/// assert_eq!(strategy.group_key(&label), "default");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// Every row in the default group
    #[default]
    Single,
    /// Group by the normalized value of a column; blank values go to the default group
    ByField {
        /// Discriminator column
        column: String,
    },
    /// Route rows whose type equals a sentinel and whose secondary column is
    /// non-empty to `"<secondary_column>:<value>"`; all others to the default group
    SpecialCase {
        /// Column holding the row type
        type_column: String,
        /// Type value that enables the special case (case-insensitive)
        sentinel: String,
        /// Column whose value names the group
        secondary_column: String,
    },
}

impl GroupingStrategy {
    /// Strategy for a request's grouping hint.
    ///
    /// `None`, `""` and `"default"` group nothing; `"character"` enables the
    /// character dialogue special case; any other hint groups by that column.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(str::trim) {
            None | Some("") => Self::Single,
            Some(h) if h.eq_ignore_ascii_case(DEFAULT_GROUP) => Self::Single,
            Some(h) if h.eq_ignore_ascii_case("character") => Self::SpecialCase {
                type_column: "type".to_string(),
                sentinel: CHARACTER_DIALOG_TYPE.to_string(),
                secondary_column: "character".to_string(),
            },
            Some(column) => Self::ByField {
                column: column.to_string(),
            },
        }
    }

    /// Group key for a single row.
    pub fn group_key(&self, row: &Row) -> String {
        match self {
            Self::Single => DEFAULT_GROUP.to_string(),
            Self::ByField { column } => {
                normalize(row.value(column)).unwrap_or_else(|| DEFAULT_GROUP.to_string())
            }
            Self::SpecialCase {
                type_column,
                sentinel,
                secondary_column,
            } => {
                let is_special = row.value(type_column).trim().eq_ignore_ascii_case(sentinel);
                match normalize(row.value(secondary_column)) {
                    Some(value) if is_special => format!("{}:{}", secondary_column, value),
                    _ => DEFAULT_GROUP.to_string(),
                }
            }
        }
    }

    /// Partition rows into groups, ordered by each group's first member.
    ///
    /// Every row lands in exactly one group, including the row that opens a
    /// new bucket.
    pub fn partition(&self, rows: Vec<Row>) -> Vec<Group> {
        let mut buckets: IndexMap<String, Vec<Row>> = IndexMap::new();
        for row in rows {
            let key = self.group_key(&row);
            buckets.entry(key).or_default().push(row);
        }
        buckets
            .into_iter()
            .map(|(key, rows)| Group::new(key, rows))
            .collect()
    }
}

fn normalize(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_lowercase())
}
