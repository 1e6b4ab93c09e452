//! Grid protocol types.
//!
//! Provides type definitions for server-side grid processing:
//! - GridRequest: decoded, validated request descriptor
//! - Predicate: composable filter expression tree
//! - GridResponse: wire-format result page

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors produced while processing a grid request.
///
/// Every variant is scoped to a single request/response cycle; nothing
/// here is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Malformed or missing required fields in the request payload.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A filter or sort reference the data store could not resolve.
    #[error("query error: {0}")]
    Query(String),

    /// The data store collaborator could not be reached.
    #[error("data store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Requested page length.
///
/// The wire sentinel `-1` decodes to `All`, which bypasses limit/offset
/// entirely and returns every matching row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLength {
    Limit(u64),
    All,
}

/// A single column as described by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Field key, resolved against the server-side schema map.
    pub data: String,

    /// Whether this column participates in the global search.
    pub searchable: bool,

    /// Whether this column may be referenced by sort rules.
    pub orderable: bool,

    /// Per-column search term (empty when unset).
    pub search: String,

    /// Exact-match mode, used by select-style filters built from
    /// distinct column values.
    pub exact: bool,
}

/// A single requested sort rule, referencing `columns` by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortRule {
    pub column: usize,
    pub dir: SortDirection,
}

/// Decoded, validated request descriptor.
///
/// Created fresh per user interaction and immutable once decoded. Carries
/// everything the engine needs; nothing is read from ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRequest {
    /// Correlation token, UI-assigned, echoed back unmodified.
    pub draw: i64,

    /// Page offset (rows to skip).
    pub start: u64,

    /// Page length.
    pub length: PageLength,

    /// Global search term (empty when unset).
    pub search: String,

    /// Ordered column descriptors; `order` references these by index.
    pub columns: Vec<ColumnSpec>,

    /// Requested sort rules, applied in sequence.
    pub order: Vec<SortRule>,

    /// Unrecognized scalar wire parameters, retained for domain filters
    /// (e.g. range bounds) so each request is self-contained.
    pub extra: HashMap<String, String>,
}

/// Resolved sort entry handed to the data store: a storage column plus
/// direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Composable filter expression tree over storage columns.
///
/// The same tree compiles to SQL (`source::postgres`) and evaluates per
/// row (`matches`), so every source shares exact filter semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Universal truth: no filtering at all.
    True,
    /// Case-insensitive substring match.
    Contains { column: String, term: String },
    /// Exact string equality.
    Equals { column: String, value: String },
    /// Numeric range; an absent bound leaves that side unconstrained.
    Range {
        column: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Conjunction. Empty conjunctions are vacuously true.
    All(Vec<Predicate>),
    /// Disjunction. Empty disjunctions are false.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Whether this predicate matches every row.
    pub fn is_true(&self) -> bool {
        matches!(self, Predicate::True)
    }

    /// Conjoin branches, collapsing the trivial cases.
    pub fn conjoin(mut branches: Vec<Predicate>) -> Predicate {
        branches.retain(|p| !p.is_true());
        match branches.len() {
            0 => Predicate::True,
            1 => branches.remove(0),
            _ => Predicate::All(branches),
        }
    }

    /// Disjoin branches, collapsing the single-branch case.
    pub fn disjoin(mut branches: Vec<Predicate>) -> Predicate {
        match branches.len() {
            1 => branches.remove(0),
            _ => Predicate::Any(branches),
        }
    }

    /// Evaluate this predicate against a candidate row.
    ///
    /// Rows are JSON objects keyed by storage column. Missing or null
    /// values never match a `Contains`/`Equals` branch; a `Range` branch
    /// treats non-numeric values as not matching.
    pub fn matches(&self, row: &serde_json::Value) -> bool {
        match self {
            Predicate::True => true,
            Predicate::Contains { column, term } => field_string(row, column)
                .is_some_and(|v| v.to_lowercase().contains(&term.to_lowercase())),
            Predicate::Equals { column, value } => {
                field_string(row, column).is_some_and(|v| v == *value)
            }
            Predicate::Range { column, min, max } => {
                if min.is_none() && max.is_none() {
                    return true;
                }
                match field_number(row, column) {
                    Some(v) => min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m),
                    None => false,
                }
            }
            Predicate::All(branches) => branches.iter().all(|p| p.matches(row)),
            Predicate::Any(branches) => branches.iter().any(|p| p.matches(row)),
        }
    }
}

/// Filtered count plus one page of rows — the second logical read
/// against the data store.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Count of rows matching the predicate, before paging.
    pub filtered: u64,
    /// The requested page of matching rows.
    pub rows: Vec<serde_json::Value>,
}

/// Wire-format result page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridResponse {
    /// Echoed correlation token.
    pub draw: i64,

    /// Count of rows ignoring all filters.
    #[serde(rename = "recordsTotal")]
    pub records_total: u64,

    /// Count of rows after filters, before paging.
    #[serde(rename = "recordsFiltered")]
    pub records_filtered: u64,

    /// Formatted rows for the requested page.
    pub data: Vec<serde_json::Value>,

    /// Present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GridResponse {
    /// Build the failure page: zero counts, no rows, the error message,
    /// and the correlation token so the client can still identify (and
    /// discard) the response.
    pub fn error(draw: i64, message: impl Into<String>) -> Self {
        Self {
            draw,
            records_total: 0,
            records_filtered: 0,
            data: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Extract a field from a row as a string for comparison.
/// Returns `None` for null or missing values to prevent false matches.
pub(crate) fn field_string(row: &serde_json::Value, column: &str) -> Option<String> {
    match row.get(column)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Extract a field from a row as a number, accepting numeric strings.
pub(crate) fn field_number(row: &serde_json::Value, column: &str) -> Option<f64> {
    match row.get(column)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
