//! Destination addressing.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A spreadsheet document and the named collection (sheet tab) inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, derive_more::Display)]
#[display("{}/{}", id, collection)]
pub struct Destination {
    /// Spreadsheet identifier
    id: String,
    /// Sheet (tab) name
    collection: String,
}

impl Destination {
    /// Create a destination address.
    pub fn new(id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
        }
    }
}
