//! Data store collaborator interface.
//!
//! The engine never talks to storage directly; it issues exactly two
//! logical reads per request through this trait. Implementations live
//! under `crate::source`.

use async_trait::async_trait;

use super::types::{GridError, Predicate, Selection, SortSpec};

/// A queryable row store.
///
/// The two reads of one request are not required to be transactionally
/// consistent with each other: under concurrent writers, the total
/// count, filtered count, and returned rows may drift. The engine
/// tolerates this and does not lock or retry.
#[async_trait]
pub trait GridSource: Send + Sync {
    /// Count every row, ignoring all filters.
    async fn count(&self) -> Result<u64, GridError>;

    /// Count the rows matching `predicate` and return the page selected
    /// by `order`, `start`, and `length`. `length == None` means all
    /// matching rows, with no offset applied.
    async fn select(
        &self,
        predicate: &Predicate,
        order: &[SortSpec],
        start: u64,
        length: Option<u64>,
    ) -> Result<Selection, GridError>;
}
