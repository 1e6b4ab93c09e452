//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::config::Config;
use crate::db;
use crate::grid::{GridProcessor, GridSchema, RangeFilter, SortDirection, currency, iso_date};
use crate::source::PgGridSource;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Grid pipeline for the employees endpoint.
    employee_grid: GridProcessor,

    /// Data source the employees grid reads from.
    employee_source: PgGridSource,
}

impl AppState {
    /// Build application state over an existing pool.
    pub fn new(config: &Config, pool: PgPool) -> Result<Self> {
        let employee_grid = employee_grid(config.default_page_length);
        let employee_source = PgGridSource::new(pool.clone(), "employees");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db: pool,
                employee_grid,
                employee_source,
            }),
        })
    }

    /// Database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// The employees grid pipeline.
    pub fn employee_grid(&self) -> &GridProcessor {
        &self.inner.employee_grid
    }

    /// The employees grid data source.
    pub fn employee_source(&self) -> &PgGridSource {
        &self.inner.employee_source
    }

    /// Check PostgreSQL reachability.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}

/// The employees grid: schema over the six display columns, an age range
/// filter reading `minAge`/`maxAge` from the request, and display
/// transforms for salary and start date.
fn employee_grid(default_page_length: u64) -> GridProcessor {
    let schema = GridSchema::new("employees")
        .field("name", "name")
        .field("position", "position")
        .field("office", "office")
        .field("age", "age")
        .field("start_date", "start_date")
        .field("salary", "salary")
        .default_order("id", SortDirection::Asc);

    GridProcessor::new(schema)
        .with_default_length(default_page_length)
        .with_domain_filter(RangeFilter::new("age", "minAge", "maxAge"))
        .with_transform("salary", currency)
        .with_transform("start_date", iso_date)
}
