//! Filter compilation.
//!
//! Folds the global search term, per-column terms, and registered domain
//! filters into a single [`Predicate`] tree: an OR-group across the
//! searchable columns for the global term, one AND-branch per column
//! term, and one AND-branch per contributing domain filter. A request
//! with no active filter compiles to [`Predicate::True`], so the
//! filtered count stays equal to the total count.

use std::sync::Arc;

use super::schema::GridSchema;
use super::types::{GridRequest, Predicate};

/// Application-defined filter consulted once per request.
///
/// Implementations read whatever request-scoped parameters they need
/// (usually from [`GridRequest::extra`]) and contribute a predicate that
/// is ANDed into the compiled tree, or `None` to stay inactive. They
/// must not consult ambient state: the request carries everything.
pub trait DomainFilter: Send + Sync {
    fn predicate(&self, request: &GridRequest) -> Option<Predicate>;
}

/// Numeric range filter over one storage column, with its bounds carried
/// as named extra request parameters.
///
/// A bound that is absent or non-numeric leaves that side unconstrained;
/// with both bounds absent the filter contributes nothing.
pub struct RangeFilter {
    column: String,
    min_param: String,
    max_param: String,
}

impl RangeFilter {
    pub fn new(
        column: impl Into<String>,
        min_param: impl Into<String>,
        max_param: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            min_param: min_param.into(),
            max_param: max_param.into(),
        }
    }
}

impl DomainFilter for RangeFilter {
    fn predicate(&self, request: &GridRequest) -> Option<Predicate> {
        let bound = |param: &str| {
            request
                .extra
                .get(param)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
        };
        let min = bound(&self.min_param);
        let max = bound(&self.max_param);
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Predicate::Range {
            column: self.column.clone(),
            min,
            max,
        })
    }
}

/// Compile a request into a single predicate tree.
///
/// Column references that do not resolve through the schema are dropped
/// with a debug log rather than failing the request.
pub fn compile(
    request: &GridRequest,
    schema: &GridSchema,
    domain_filters: &[Arc<dyn DomainFilter>],
) -> Predicate {
    let mut branches = Vec::new();

    if !request.search.is_empty() {
        let global: Vec<Predicate> = request
            .columns
            .iter()
            .filter(|column| column.searchable)
            .filter_map(|column| schema.resolve(&column.data))
            .map(|storage| Predicate::Contains {
                column: storage.to_string(),
                term: request.search.clone(),
            })
            .collect();
        if !global.is_empty() {
            branches.push(Predicate::disjoin(global));
        }
    }

    for column in &request.columns {
        if !column.searchable || column.search.is_empty() {
            continue;
        }
        match schema.resolve(&column.data) {
            Some(storage) => branches.push(if column.exact {
                Predicate::Equals {
                    column: storage.to_string(),
                    value: column.search.clone(),
                }
            } else {
                Predicate::Contains {
                    column: storage.to_string(),
                    term: column.search.clone(),
                }
            }),
            None => {
                tracing::debug!(field = %column.data, "dropping filter on unmapped field");
            }
        }
    }

    for filter in domain_filters {
        if let Some(predicate) = filter.predicate(request) {
            branches.push(predicate);
        }
    }

    Predicate::conjoin(branches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::types::{ColumnSpec, PageLength, SortDirection};
    use std::collections::HashMap;

    fn column(data: &str, searchable: bool) -> ColumnSpec {
        ColumnSpec {
            data: data.to_string(),
            searchable,
            orderable: true,
            search: String::new(),
            exact: false,
        }
    }

    fn request(columns: Vec<ColumnSpec>, search: &str) -> GridRequest {
        GridRequest {
            draw: 1,
            start: 0,
            length: PageLength::Limit(10),
            search: search.to_string(),
            columns,
            order: Vec::new(),
            extra: HashMap::new(),
        }
    }

    fn schema() -> GridSchema {
        GridSchema::new("employees")
            .field("name", "name")
            .field("office", "office")
            .field("age", "age")
            .default_order("id", SortDirection::Asc)
    }

    #[test]
    fn no_filters_compiles_to_true() {
        let req = request(vec![column("name", true)], "");
        assert!(compile(&req, &schema(), &[]).is_true());
    }

    #[test]
    fn global_search_spans_searchable_columns_only() {
        let req = request(
            vec![
                column("name", true),
                column("office", true),
                column("age", false),
            ],
            "lon",
        );
        let predicate = compile(&req, &schema(), &[]);
        assert_eq!(
            predicate,
            Predicate::Any(vec![
                Predicate::Contains {
                    column: "name".to_string(),
                    term: "lon".to_string()
                },
                Predicate::Contains {
                    column: "office".to_string(),
                    term: "lon".to_string()
                },
            ])
        );
    }

    #[test]
    fn column_terms_become_and_branches() {
        let mut name = column("name", true);
        name.search = "cedric".to_string();
        let mut office = column("office", true);
        office.search = "Tokyo".to_string();
        office.exact = true;

        let req = request(vec![name, office], "");
        let predicate = compile(&req, &schema(), &[]);
        assert_eq!(
            predicate,
            Predicate::All(vec![
                Predicate::Contains {
                    column: "name".to_string(),
                    term: "cedric".to_string()
                },
                Predicate::Equals {
                    column: "office".to_string(),
                    value: "Tokyo".to_string()
                },
            ])
        );
    }

    #[test]
    fn unmapped_field_dropped_not_fatal() {
        let mut ghost = column("ghost", true);
        ghost.search = "x".to_string();
        let req = request(vec![ghost], "");
        assert!(compile(&req, &schema(), &[]).is_true());
    }

    #[test]
    fn range_filter_reads_request_extras() {
        let filter = RangeFilter::new("age", "minAge", "maxAge");

        let mut req = request(vec![], "");
        assert!(filter.predicate(&req).is_none());

        req.extra.insert("minAge".to_string(), "30".to_string());
        assert_eq!(
            filter.predicate(&req),
            Some(Predicate::Range {
                column: "age".to_string(),
                min: Some(30.0),
                max: None
            })
        );

        req.extra.insert("maxAge".to_string(), "oops".to_string());
        assert_eq!(
            filter.predicate(&req),
            Some(Predicate::Range {
                column: "age".to_string(),
                min: Some(30.0),
                max: None
            })
        );
    }

    #[test]
    fn domain_filter_joins_the_conjunction() {
        let mut req = request(vec![column("name", true)], "a");
        req.extra.insert("minAge".to_string(), "21".to_string());

        let filters: Vec<Arc<dyn DomainFilter>> =
            vec![Arc::new(RangeFilter::new("age", "minAge", "maxAge"))];
        let predicate = compile(&req, &schema(), &filters);

        match predicate {
            Predicate::All(branches) => {
                assert_eq!(branches.len(), 2);
                assert!(matches!(branches[1], Predicate::Range { .. }));
            }
            other => panic!("expected conjunction, got {other:?}"),
        }
    }
}
