//! Grid processing service.
//!
//! `GridProcessor` ties the pipeline together: decode → compile filters
//! and sorts → execute the two store reads → shape the response. It is
//! immutable configuration shared across requests; each call is
//! stateless and independent, so concurrent requests share nothing but
//! the data source handle.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::decode::Payload;
use super::filter::{self, DomainFilter};
use super::response::{self, Transform};
use super::schema::GridSchema;
use super::sort;
use super::source::GridSource;
use super::types::{GridError, GridResponse, PageLength};

/// Default page length applied when a request omits one and the caller
/// configured nothing else.
pub const DEFAULT_PAGE_LENGTH: u64 = 10;

/// One grid's processing pipeline: schema, domain filters, display
/// transforms, and decoding defaults.
pub struct GridProcessor {
    schema: GridSchema,
    domain_filters: Vec<Arc<dyn DomainFilter>>,
    transforms: HashMap<String, Arc<Transform>>,
    default_length: u64,
}

impl GridProcessor {
    /// Create a processor over the given schema.
    pub fn new(schema: GridSchema) -> Self {
        Self {
            schema,
            domain_filters: Vec::new(),
            transforms: HashMap::new(),
            default_length: DEFAULT_PAGE_LENGTH,
        }
    }

    /// Override the default page length used when a request omits one.
    pub fn with_default_length(mut self, length: u64) -> Self {
        self.default_length = length;
        self
    }

    /// Register a domain filter, consulted once per request.
    pub fn with_domain_filter(mut self, filter: impl DomainFilter + 'static) -> Self {
        self.domain_filters.push(Arc::new(filter));
        self
    }

    /// Register a display transform for one field, applied after
    /// filtering, sorting, and paging.
    pub fn with_transform(
        mut self,
        field: impl Into<String>,
        transform: impl Fn(&JsonValue) -> JsonValue + Send + Sync + 'static,
    ) -> Self {
        self.transforms.insert(field.into(), Arc::new(transform));
        self
    }

    /// The schema this processor resolves field keys against.
    pub fn schema(&self) -> &GridSchema {
        &self.schema
    }

    /// Process one request payload against a data source.
    ///
    /// Never fails: any error in decoding, compilation, or execution
    /// produces a well-formed page with zero counts, no rows, and the
    /// error message — carrying the request's correlation token
    /// (recovered leniently when full decoding failed) so the client can
    /// still identify and discard the response.
    pub async fn process(&self, source: &dyn GridSource, payload: &Payload) -> GridResponse {
        let draw = payload.peek_draw();
        match self.try_process(source, payload).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(draw, error = %e, "grid request failed");
                GridResponse::error(draw, e.to_string())
            }
        }
    }

    async fn try_process(
        &self,
        source: &dyn GridSource,
        payload: &Payload,
    ) -> Result<GridResponse, GridError> {
        let request = payload.decode(self.default_length)?;

        let predicate = filter::compile(&request, &self.schema, &self.domain_filters);
        let order = sort::resolve(&request, &self.schema);

        // Two logical reads; not transactionally consistent with each
        // other, so counts and rows may drift under concurrent writers.
        let records_total = source.count().await?;
        let (start, length) = match request.length {
            PageLength::All => (0, None),
            PageLength::Limit(n) => (request.start, Some(n)),
        };
        let selection = source.select(&predicate, &order, start, length).await?;

        tracing::debug!(
            draw = request.draw,
            records_total,
            records_filtered = selection.filtered,
            rows = selection.rows.len(),
            filtered = !predicate.is_true(),
            "grid request served"
        );

        Ok(response::build(
            request.draw,
            records_total,
            selection.filtered,
            selection.rows,
            &self.transforms,
        ))
    }
}
