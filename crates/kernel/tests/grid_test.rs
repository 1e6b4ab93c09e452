#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Grid engine integration tests.
//!
//! Exercises the full pipeline — decode, filter compilation, sort
//! resolution, execution, formatting — against the in-memory source and
//! the seeded 15-row employee dataset.

use std::collections::HashSet;

use gridwire_kernel::grid::{
    GridProcessor, GridSchema, Payload, RangeFilter, SortDirection, currency, iso_date,
};
use gridwire_kernel::source::MemorySource;
use gridwire_test_utils::employees;

fn processor() -> GridProcessor {
    let schema = GridSchema::new("employees")
        .field("name", "name")
        .field("position", "position")
        .field("office", "office")
        .field("age", "age")
        .field("start_date", "start_date")
        .field("salary", "salary")
        .default_order("id", SortDirection::Asc);

    GridProcessor::new(schema)
        .with_domain_filter(RangeFilter::new("age", "minAge", "maxAge"))
        .with_transform("salary", currency)
        .with_transform("start_date", iso_date)
}

fn source() -> MemorySource {
    MemorySource::new(employees())
}

/// Form pairs for the six standard columns, all searchable and orderable.
fn column_pairs() -> Vec<(String, String)> {
    let fields = ["name", "position", "office", "age", "start_date", "salary"];
    let mut pairs = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        pairs.push((format!("columns[{i}][data]"), (*field).to_string()));
        pairs.push((format!("columns[{i}][searchable]"), "true".to_string()));
        pairs.push((format!("columns[{i}][orderable]"), "true".to_string()));
        pairs.push((format!("columns[{i}][search][value]"), String::new()));
    }
    pairs
}

fn form_request(extra_pairs: &[(&str, &str)]) -> Payload {
    let mut pairs = column_pairs();
    for (k, v) in extra_pairs {
        pairs.push(((*k).to_string(), (*v).to_string()));
    }
    Payload::Form(pairs)
}

// -------------------------------------------------------------------------
// Paging
// -------------------------------------------------------------------------

#[tokio::test]
async fn first_page_of_fifteen() {
    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "1"), ("start", "0"), ("length", "10")]),
        )
        .await;

    assert_eq!(page.draw, 1);
    assert_eq!(page.records_total, 15);
    assert_eq!(page.records_filtered, 15);
    assert_eq!(page.data.len(), 10);
    assert!(page.error.is_none());

    // Default ordering is by id ascending.
    assert_eq!(page.data[0]["name"], "Airi Satou");

    // Display transforms applied to the page.
    assert_eq!(page.data[0]["salary"], "162,700.00");
    assert_eq!(page.data[0]["start_date"], "2008-11-28");
}

#[tokio::test]
async fn second_page_holds_the_remainder() {
    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "2"), ("start", "10"), ("length", "10")]),
        )
        .await;

    assert_eq!(page.draw, 2);
    assert_eq!(page.records_total, 15);
    assert_eq!(page.records_filtered, 15);
    assert_eq!(page.data.len(), 5);
}

#[tokio::test]
async fn length_sentinel_returns_every_row() {
    // -1 bypasses limit and offset entirely, even with a start set.
    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "1"), ("start", "10"), ("length", "-1")]),
        )
        .await;

    assert_eq!(page.data.len(), 15);
}

#[tokio::test]
async fn pagination_is_complete_and_duplicate_free() {
    let processor = processor();
    let source = source();
    let length = 5;

    let mut seen = HashSet::new();
    let mut start = 0;
    loop {
        let page = processor
            .process(
                &source,
                &form_request(&[
                    ("draw", "1"),
                    ("start", &start.to_string()),
                    ("length", &length.to_string()),
                    // Sort by a unique column so paging is deterministic.
                    ("order[0][column]", "3"),
                    ("order[0][dir]", "asc"),
                ]),
            )
            .await;

        for row in &page.data {
            assert!(
                seen.insert(row["id"].as_i64().unwrap()),
                "row {} appeared on two pages",
                row["id"]
            );
        }

        start += length;
        if start >= page.records_filtered {
            break;
        }
    }

    assert_eq!(seen.len(), 15, "every row should appear exactly once");
}

#[tokio::test]
async fn identical_requests_yield_identical_pages() {
    let processor = processor();
    let source = source();
    let payload = form_request(&[("draw", "5"), ("start", "0"), ("length", "10")]);

    let first = processor.process(&source, &payload).await;
    let second = processor.process(&source, &payload).await;
    assert_eq!(first, second);
}

// -------------------------------------------------------------------------
// Filtering
// -------------------------------------------------------------------------

#[tokio::test]
async fn no_filters_keeps_counts_equal() {
    let page = processor()
        .process(&source(), &form_request(&[("draw", "1")]))
        .await;
    assert_eq!(page.records_filtered, page.records_total);
}

#[tokio::test]
async fn senior_column_filter_narrows_to_three() {
    let mut pairs = column_pairs();
    pairs.retain(|(k, _)| k != "columns[1][search][value]");
    pairs.push(("columns[1][search][value]".to_string(), "Senior".to_string()));
    pairs.push(("draw".to_string(), "1".to_string()));
    pairs.push(("length".to_string(), "10".to_string()));

    let page = processor().process(&source(), &Payload::Form(pairs)).await;
    assert_eq!(page.records_total, 15);
    assert_eq!(page.records_filtered, 3);
    assert_eq!(page.data.len(), 3);
}

#[tokio::test]
async fn global_search_is_case_insensitive_across_columns() {
    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "1"), ("search[value]", "london")]),
        )
        .await;

    assert_eq!(page.records_total, 15);
    assert_eq!(page.records_filtered, 4);
    assert!(page.records_filtered <= page.records_total);
}

#[tokio::test]
async fn exact_match_mode_for_select_filters() {
    let mut pairs = column_pairs();
    pairs.retain(|(k, _)| k != "columns[2][search][value]");
    pairs.push((
        "columns[2][search][value]".to_string(),
        "San Francisco".to_string(),
    ));
    pairs.push(("columns[2][search][exact]".to_string(), "true".to_string()));
    pairs.push(("draw".to_string(), "1".to_string()));

    let page = processor().process(&source(), &Payload::Form(pairs)).await;
    assert_eq!(page.records_filtered, 4);

    // An exact term that only partially matches selects nothing.
    let mut pairs = column_pairs();
    pairs.retain(|(k, _)| k != "columns[2][search][value]");
    pairs.push(("columns[2][search][value]".to_string(), "Francisco".to_string()));
    pairs.push(("columns[2][search][exact]".to_string(), "true".to_string()));

    let page = processor().process(&source(), &Payload::Form(pairs)).await;
    assert_eq!(page.records_filtered, 0);
}

#[tokio::test]
async fn age_range_filter_from_request_parameters() {
    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "1"), ("minAge", "30"), ("maxAge", "40")]),
        )
        .await;

    // Ages 33, 35, 36, 38, 39 fall inside the range.
    assert_eq!(page.records_total, 15);
    assert_eq!(page.records_filtered, 5);

    // One-sided range.
    let page = processor()
        .process(&source(), &form_request(&[("draw", "2"), ("minAge", "60")]))
        .await;
    assert_eq!(page.records_filtered, 3);
}

#[tokio::test]
async fn transforms_never_affect_matching() {
    // "162,700.00" exists only in the rendered output; the raw value is
    // numeric, so searching for the formatted text finds nothing.
    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "1"), ("search[value]", "162,700.00")]),
        )
        .await;
    assert_eq!(page.records_filtered, 0);

    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "2"), ("search[value]", "162700")]),
        )
        .await;
    assert_eq!(page.records_filtered, 1);
}

// -------------------------------------------------------------------------
// Sorting
// -------------------------------------------------------------------------

#[tokio::test]
async fn requested_sort_orders_the_page() {
    let page = processor()
        .process(
            &source(),
            &form_request(&[
                ("draw", "1"),
                ("length", "3"),
                ("order[0][column]", "3"),
                ("order[0][dir]", "desc"),
            ]),
        )
        .await;

    let ages: Vec<i64> = page
        .data
        .iter()
        .map(|r| r["age"].as_i64().unwrap())
        .collect();
    assert_eq!(ages, vec![66, 63, 61]);
}

#[tokio::test]
async fn unknown_sort_index_falls_back_to_default_order() {
    let page = processor()
        .process(
            &source(),
            &form_request(&[
                ("draw", "1"),
                ("length", "10"),
                ("order[0][column]", "99"),
                ("order[0][dir]", "desc"),
            ]),
        )
        .await;

    assert!(page.error.is_none(), "unknown sort index must not fail");
    assert_eq!(page.data[0]["id"], 1, "should fall back to id ordering");
}

// -------------------------------------------------------------------------
// Error handling
// -------------------------------------------------------------------------

#[tokio::test]
async fn error_page_is_well_formed_and_echoes_draw() {
    let page = processor()
        .process(
            &source(),
            &form_request(&[("draw", "9"), ("length", "-3")]),
        )
        .await;

    assert_eq!(page.draw, 9);
    assert_eq!(page.records_total, 0);
    assert_eq!(page.records_filtered, 0);
    assert!(page.data.is_empty());
    assert!(page.error.is_some());
}

#[tokio::test]
async fn json_payloads_decode_equivalently() {
    let payload = Payload::Json(serde_json::json!({
        "draw": 3,
        "start": 0,
        "length": 10,
        "search": {"value": "tokyo"},
        "columns": [
            {"data": "name", "searchable": true, "orderable": true},
            {"data": "office", "searchable": true, "orderable": true},
        ],
        "order": [{"column": 1, "dir": "asc"}],
    }));

    let page = processor().process(&source(), &payload).await;
    assert_eq!(page.draw, 3);
    assert_eq!(page.records_filtered, 2);
}
