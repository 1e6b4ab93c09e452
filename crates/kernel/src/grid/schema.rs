//! Schema mapping between wire field keys and storage columns.
//!
//! Wire requests reference columns by client-supplied field key; nothing
//! from the wire reaches storage directly. Every filter and sort
//! reference resolves through this map, and references that do not
//! resolve are dropped by the compiler rather than forwarded.

use super::types::{SortDirection, SortSpec};

/// Server-owned description of one grid: the base table, the field-key →
/// storage-column map, and the default ordering used when the client
/// requests none (offset paging over an unordered result set can skip or
/// duplicate rows between pages).
#[derive(Debug, Clone)]
pub struct GridSchema {
    table: String,
    fields: Vec<(String, String)>,
    default_order: Vec<SortSpec>,
}

impl GridSchema {
    /// Create a schema for the given base table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            default_order: Vec::new(),
        }
    }

    /// Map a wire field key to a storage column.
    pub fn field(mut self, key: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.push((key.into(), column.into()));
        self
    }

    /// Append a default ordering entry, applied when the request carries
    /// no usable sort rule. Typically the primary key.
    pub fn default_order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.default_order.push(SortSpec {
            column: column.into(),
            direction,
        });
        self
    }

    /// Base table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Resolve a wire field key to its storage column.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, column)| column.as_str())
    }

    /// The configured default ordering.
    pub fn default_sort(&self) -> &[SortSpec] {
        &self.default_order
    }
}
