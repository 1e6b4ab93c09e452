//! Grid source implementations.
//!
//! - `PgGridSource`: PostgreSQL over sqlx, SQL generated with SeaQuery
//! - `MemorySource`: in-memory rows with per-row predicate evaluation

mod memory;
mod postgres;

pub use memory::MemorySource;
pub use postgres::PgGridSource;
