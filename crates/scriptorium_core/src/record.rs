//! Parsed generation results.

use crate::Row;
use derive_getters::Getters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One structured result parsed from a backend response.
///
/// Translation records carry `{ <language>: text }`, story records carry the
/// script columns. A record with `failure` set is a sentinel for a row whose
/// generation failed; it is reported but never written.
///
/// # Examples
///
/// ```
/// use scriptorium_core::ResultRecord;
///
/// let record = ResultRecord::new("k1").with_field("fr", "Bonjour");
/// assert_eq!(record.field("fr"), Some("Bonjour"));
/// assert!(!record.is_failure());
///
/// let failed = ResultRecord::failed("k2", "timeout");
/// assert!(failed.is_failure());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ResultRecord {
    /// Business key the result belongs to
    key: String,
    /// Produced values by column
    #[serde(flatten)]
    fields: IndexMap<String, String>,
    /// Failure description for sentinel records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

impl ResultRecord {
    /// Create an empty record for a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: IndexMap::new(),
            failure: None,
        }
    }

    /// Create a sentinel record for a failed row.
    pub fn failed(key: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: IndexMap::new(),
            failure: Some(failure.into()),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    /// Value of a produced column.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Whether this is a failure sentinel.
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Convert into a sheet row (key plus produced columns).
    pub fn to_row(&self) -> Row {
        self.fields
            .iter()
            .fold(Row::new(self.key.clone()), |row, (column, value)| {
                row.with_field(column.clone(), value.clone())
            })
    }
}
