//! Server-side grid processing engine.
//!
//! This module provides:
//! - Payload/GridRequest: wire decoding into a validated descriptor
//! - GridSchema: field-key → storage-column resolution
//! - Predicate: composable filter tree shared by every data source
//! - GridProcessor: the decode → filter → sort → execute → format pipeline
//! - DrawGate: the client-side correlation contract

mod decode;
mod filter;
mod response;
mod schema;
mod service;
mod sort;
mod source;
pub mod types;

pub use decode::Payload;
pub use filter::{DomainFilter, RangeFilter, compile};
pub use response::{DrawGate, Transform, currency, iso_date};
pub use schema::GridSchema;
pub use service::{DEFAULT_PAGE_LENGTH, GridProcessor};
pub use sort::resolve as resolve_sort;
pub use source::GridSource;
pub use types::{
    ColumnSpec, GridError, GridRequest, GridResponse, PageLength, Predicate, Selection,
    SortDirection, SortRule, SortSpec,
};
