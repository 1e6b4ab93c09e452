//! PostgreSQL grid source using SeaQuery.
//!
//! Compiles [`Predicate`] trees and sort specifications into SQL and
//! executes them over a sqlx pool. Rows come back as JSON objects via
//! `row_to_json`, so the engine stays agnostic of the table's shape.

use async_trait::async_trait;
use sea_query::{
    Alias, Asterisk, Expr, ExprTrait, Func, Order, PostgresQueryBuilder, Query, SelectStatement,
    SimpleExpr,
};
use sqlx::PgPool;

use crate::grid::{GridError, GridSource, Predicate, Selection, SortDirection, SortSpec};

/// Grid source backed by one PostgreSQL table.
pub struct PgGridSource {
    pool: PgPool,
    table: String,
}

impl PgGridSource {
    /// Create a source over the given table.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl GridSource for PgGridSource {
    async fn count(&self) -> Result<u64, GridError> {
        let sql = count_sql(&self.table, &Predicate::True);
        let total: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_store_error)?;
        Ok(total.max(0) as u64)
    }

    async fn select(
        &self,
        predicate: &Predicate,
        order: &[SortSpec],
        start: u64,
        length: Option<u64>,
    ) -> Result<Selection, GridError> {
        let filtered: i64 = sqlx::query_scalar(&count_sql(&self.table, predicate))
            .fetch_one(&self.pool)
            .await
            .map_err(map_store_error)?;

        let page_sql = select_sql(&self.table, predicate, order, start, length);
        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar(&format!("SELECT row_to_json(t) FROM ({page_sql}) t"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_store_error)?;

        Ok(Selection {
            filtered: filtered.max(0) as u64,
            rows,
        })
    }
}

/// Classify a sqlx failure: connectivity problems surface as
/// `StoreUnavailable`; everything the server itself rejected (unknown
/// columns, type mismatches) as `Query`.
fn map_store_error(e: sqlx::Error) -> GridError {
    match &e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => GridError::StoreUnavailable(e.to_string()),
        sqlx::Error::Database(db) => GridError::Query(db.message().to_string()),
        _ => GridError::Query(e.to_string()),
    }
}

fn count_sql(table: &str, predicate: &Predicate) -> String {
    let mut query = Query::select();
    query
        .expr(Expr::col(Asterisk).count())
        .from(Alias::new(table));
    apply_predicate(&mut query, predicate);
    query.to_string(PostgresQueryBuilder)
}

fn select_sql(
    table: &str,
    predicate: &Predicate,
    order: &[SortSpec],
    start: u64,
    length: Option<u64>,
) -> String {
    let mut query = Query::select();
    query.column(Asterisk).from(Alias::new(table));
    apply_predicate(&mut query, predicate);

    for spec in order {
        let direction = match spec.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        query.order_by(Alias::new(&spec.column), direction);
    }

    if let Some(limit) = length {
        query.limit(limit);
        query.offset(start);
    }

    query.to_string(PostgresQueryBuilder)
}

fn apply_predicate(query: &mut SelectStatement, predicate: &Predicate) {
    if let Some(expr) = condition(predicate) {
        query.and_where(expr);
    }
}

/// Lower a predicate tree to a SQL expression. `None` means "no WHERE
/// clause at all" (the universal predicate).
fn condition(predicate: &Predicate) -> Option<SimpleExpr> {
    match predicate {
        Predicate::True => None,
        Predicate::Contains { column, term } => {
            let lowered = Func::lower(Expr::col(Alias::new(column)).cast_as(Alias::new("text")));
            Some(Expr::expr(lowered).like(format!(
                "%{}%",
                escape_like_wildcards(&term.to_lowercase())
            )))
        }
        Predicate::Equals { column, value } => Some(
            Expr::col(Alias::new(column))
                .cast_as(Alias::new("text"))
                .eq(value.clone()),
        ),
        Predicate::Range { column, min, max } => {
            let number = || Expr::col(Alias::new(column)).cast_as(Alias::new("float8"));
            let mut expr: Option<SimpleExpr> = None;
            if let Some(min) = min {
                expr = Some(number().gte(*min));
            }
            if let Some(max) = max {
                let bound = number().lte(*max);
                expr = Some(match expr {
                    Some(e) => e.and(bound),
                    None => bound,
                });
            }
            expr
        }
        Predicate::All(branches) => fold(branches, |a, b| a.and(b)),
        Predicate::Any(branches) => {
            if branches.is_empty() {
                // An empty disjunction matches nothing.
                return Some(Expr::value(false));
            }
            fold(branches, |a, b| a.or(b))
        }
    }
}

fn fold<F>(branches: &[Predicate], combine: F) -> Option<SimpleExpr>
where
    F: Fn(SimpleExpr, SimpleExpr) -> SimpleExpr,
{
    branches.iter().filter_map(condition).reduce(combine)
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(column: &str, term: &str) -> Predicate {
        Predicate::Contains {
            column: column.to_string(),
            term: term.to_string(),
        }
    }

    #[test]
    fn universal_predicate_omits_where() {
        let sql = count_sql("employees", &Predicate::True);
        assert!(sql.contains("COUNT(*)"));
        assert!(sql.contains("FROM \"employees\""));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn contains_lowers_both_sides() {
        let sql = count_sql("employees", &contains("name", "Airi"));
        assert!(sql.contains("LOWER"), "should lower the column: {sql}");
        assert!(sql.contains("%airi%"), "term should be lowercased: {sql}");
        assert!(sql.contains("LIKE"), "{sql}");
    }

    #[test]
    fn like_wildcards_escaped() {
        let sql = count_sql("employees", &contains("name", "100%_a"));
        assert!(
            !sql.contains("%100%_a%"),
            "raw wildcard chars should not survive: {sql}"
        );
    }

    #[test]
    fn global_search_renders_or_group() {
        let predicate = Predicate::Any(vec![contains("name", "lon"), contains("office", "lon")]);
        let sql = count_sql("employees", &predicate);
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn column_filters_render_and_group() {
        let predicate = Predicate::All(vec![
            contains("name", "a"),
            Predicate::Equals {
                column: "office".to_string(),
                value: "Tokyo".to_string(),
            },
        ]);
        let sql = count_sql("employees", &predicate);
        assert!(sql.contains(" AND "), "{sql}");
        assert!(sql.contains("'Tokyo'"), "{sql}");
    }

    #[test]
    fn range_renders_requested_bounds_only() {
        let both = Predicate::Range {
            column: "age".to_string(),
            min: Some(30.0),
            max: Some(40.0),
        };
        let sql = count_sql("employees", &both);
        assert!(sql.contains(">="), "{sql}");
        assert!(sql.contains("<="), "{sql}");

        let min_only = Predicate::Range {
            column: "age".to_string(),
            min: Some(30.0),
            max: None,
        };
        let sql = count_sql("employees", &min_only);
        assert!(sql.contains(">="), "{sql}");
        assert!(!sql.contains("<="), "{sql}");

        let unbounded = Predicate::Range {
            column: "age".to_string(),
            min: None,
            max: None,
        };
        assert!(!count_sql("employees", &unbounded).contains("WHERE"));
    }

    #[test]
    fn select_orders_and_pages() {
        let order = vec![
            SortSpec {
                column: "salary".to_string(),
                direction: SortDirection::Desc,
            },
            SortSpec {
                column: "id".to_string(),
                direction: SortDirection::Asc,
            },
        ];
        let sql = select_sql("employees", &Predicate::True, &order, 10, Some(10));
        assert!(
            sql.contains("ORDER BY \"salary\" DESC, \"id\" ASC"),
            "{sql}"
        );
        assert!(sql.contains("LIMIT 10"), "{sql}");
        assert!(sql.contains("OFFSET 10"), "{sql}");
    }

    #[test]
    fn all_rows_omits_limit_and_offset() {
        let sql = select_sql("employees", &Predicate::True, &[], 0, None);
        assert!(!sql.contains("LIMIT"), "{sql}");
        assert!(!sql.contains("OFFSET"), "{sql}");
    }

    #[test]
    fn escape_like_wildcards_function() {
        assert_eq!(escape_like_wildcards("hello"), "hello");
        assert_eq!(escape_like_wildcards("100%"), "100\\%");
        assert_eq!(escape_like_wildcards("a_b"), "a\\_b");
        assert_eq!(escape_like_wildcards("a\\b"), "a\\\\b");
    }
}
