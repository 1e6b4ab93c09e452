//! Sort resolution.
//!
//! Maps requested sort rules to storage columns, dropping rules that
//! reference non-orderable columns or field keys outside the schema.
//! When nothing survives, the schema's default ordering applies so that
//! offset-based paging stays stable. No implicit tie-break column is
//! appended; callers wanting full determinism under ties include a
//! unique column explicitly.

use super::schema::GridSchema;
use super::types::{GridRequest, SortSpec};

/// Resolve the request's sort rules into an ordered list of storage
/// columns for the executor.
pub fn resolve(request: &GridRequest, schema: &GridSchema) -> Vec<SortSpec> {
    let mut specs = Vec::new();

    for rule in &request.order {
        let Some(column) = request.columns.get(rule.column) else {
            // The decoder drops these, but hand-built requests may not.
            tracing::warn!(index = rule.column, "sort rule references missing column");
            continue;
        };
        if !column.orderable {
            tracing::warn!(field = %column.data, "sort rule references non-orderable column");
            continue;
        }
        match schema.resolve(&column.data) {
            Some(storage) => specs.push(SortSpec {
                column: storage.to_string(),
                direction: rule.dir,
            }),
            None => {
                tracing::warn!(field = %column.data, "sort rule references unmapped field");
            }
        }
    }

    if specs.is_empty() {
        specs.extend_from_slice(schema.default_sort());
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::types::{ColumnSpec, PageLength, SortDirection, SortRule};
    use std::collections::HashMap;

    fn column(data: &str, orderable: bool) -> ColumnSpec {
        ColumnSpec {
            data: data.to_string(),
            searchable: true,
            orderable,
            search: String::new(),
            exact: false,
        }
    }

    fn request(columns: Vec<ColumnSpec>, order: Vec<SortRule>) -> GridRequest {
        GridRequest {
            draw: 1,
            start: 0,
            length: PageLength::Limit(10),
            search: String::new(),
            columns,
            order,
            extra: HashMap::new(),
        }
    }

    fn schema() -> GridSchema {
        GridSchema::new("employees")
            .field("name", "name")
            .field("salary", "salary")
            .default_order("id", SortDirection::Asc)
    }

    #[test]
    fn empty_order_falls_back_to_default() {
        let req = request(vec![column("name", true)], vec![]);
        let specs = resolve(&req, &schema());
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].column, "id");
    }

    #[test]
    fn rules_apply_in_sequence() {
        let req = request(
            vec![column("name", true), column("salary", true)],
            vec![
                SortRule {
                    column: 1,
                    dir: SortDirection::Desc,
                },
                SortRule {
                    column: 0,
                    dir: SortDirection::Asc,
                },
            ],
        );
        let specs = resolve(&req, &schema());
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].column, "salary");
        assert_eq!(specs[0].direction, SortDirection::Desc);
        assert_eq!(specs[1].column, "name");
    }

    #[test]
    fn non_orderable_rule_dropped() {
        let req = request(
            vec![column("name", false)],
            vec![SortRule {
                column: 0,
                dir: SortDirection::Asc,
            }],
        );
        let specs = resolve(&req, &schema());
        assert_eq!(specs[0].column, "id", "should fall back to default order");
    }

    #[test]
    fn unmapped_field_rule_dropped() {
        let req = request(
            vec![column("ghost", true)],
            vec![SortRule {
                column: 0,
                dir: SortDirection::Asc,
            }],
        );
        let specs = resolve(&req, &schema());
        assert_eq!(specs[0].column, "id");
    }

    #[test]
    fn missing_column_index_dropped() {
        let req = request(
            vec![column("name", true)],
            vec![SortRule {
                column: 7,
                dir: SortDirection::Asc,
            }],
        );
        let specs = resolve(&req, &schema());
        assert_eq!(specs[0].column, "id");
    }
}
