//! In-memory grid source.
//!
//! Rows are JSON objects held in memory; predicates are evaluated per
//! candidate row via [`Predicate::matches`], so filter semantics match
//! the SQL compilation exactly. This is the reference implementation
//! used by the integration tests, and serves small datasets that never
//! touch a database.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

use crate::grid::types::{field_number, field_string};
use crate::grid::{GridError, GridSource, Predicate, Selection, SortDirection, SortSpec};

/// Grid source over an in-memory vector of JSON rows.
///
/// Uses `parking_lot::RwLock` rather than `std::sync::RwLock` because:
/// - No poisoning: a panic in a writer won't permanently wedge every reader.
/// - Shorter critical sections avoid blocking Tokio worker threads.
pub struct MemorySource {
    rows: RwLock<Vec<JsonValue>>,
}

impl MemorySource {
    /// Create a source seeded with the given rows.
    pub fn new(rows: Vec<JsonValue>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Append a row. Concurrent with reads; the engine tolerates the
    /// resulting count drift.
    pub fn insert(&self, row: JsonValue) {
        self.rows.write().push(row);
    }

    /// Replace the full dataset.
    pub fn replace(&self, rows: Vec<JsonValue>) {
        *self.rows.write() = rows;
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl GridSource for MemorySource {
    async fn count(&self) -> Result<u64, GridError> {
        Ok(self.rows.read().len() as u64)
    }

    async fn select(
        &self,
        predicate: &Predicate,
        order: &[SortSpec],
        start: u64,
        length: Option<u64>,
    ) -> Result<Selection, GridError> {
        let mut matching: Vec<JsonValue> = self
            .rows
            .read()
            .iter()
            .filter(|row| predicate.matches(row))
            .cloned()
            .collect();
        let filtered = matching.len() as u64;

        // Stable sort: rows equal under every spec keep insertion order.
        matching.sort_by(|a, b| compare_rows(a, b, order));

        let rows = match length {
            Some(limit) => matching
                .into_iter()
                .skip(start as usize)
                .take(limit as usize)
                .collect(),
            None => matching,
        };

        Ok(Selection { filtered, rows })
    }
}

fn compare_rows(a: &JsonValue, b: &JsonValue, order: &[SortSpec]) -> Ordering {
    for spec in order {
        let ordering = compare_values(a, b, &spec.column);
        let ordering = match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Compare one column of two rows: numerically when both sides are
/// numeric, case-insensitive string order otherwise. Missing/null values
/// sort first ascending.
fn compare_values(a: &JsonValue, b: &JsonValue, column: &str) -> Ordering {
    match (present(a, column), present(b, column)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(_), Some(_)) => {
            if let (Some(x), Some(y)) = (field_number(a, column), field_number(b, column)) {
                x.total_cmp(&y)
            } else {
                let x = field_string(a, column).unwrap_or_default().to_lowercase();
                let y = field_string(b, column).unwrap_or_default().to_lowercase();
                x.cmp(&y)
            }
        }
    }
}

fn present<'a>(row: &'a JsonValue, column: &str) -> Option<&'a JsonValue> {
    match row.get(column) {
        Some(JsonValue::Null) | None => None,
        Some(value) => Some(value),
    }
}
