//! Request decoding.
//!
//! Turns an untyped wire payload — form-encoded bracket keys or a JSON
//! document — into a validated [`GridRequest`]. Parsing is deliberately
//! tolerant: the client's column set may have changed between page loads,
//! so unknown sort indices are dropped rather than failing the request,
//! and missing numeric fields fall back to safe defaults.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use super::types::{ColumnSpec, GridError, GridRequest, PageLength, SortDirection, SortRule};

/// An undecoded request body.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Form-encoded key/value pairs (`columns[0][data]=name&...`).
    Form(Vec<(String, String)>),
    /// A JSON document with nested `search`/`columns`/`order` objects.
    Json(JsonValue),
}

impl Payload {
    /// Classify and parse a raw request body by content type.
    ///
    /// Anything that does not declare JSON is treated as a form body;
    /// form parsing itself cannot fail.
    pub fn from_bytes(content_type: Option<&str>, body: &[u8]) -> Result<Self, GridError> {
        if content_type.is_some_and(|ct| ct.contains("json")) {
            let value = serde_json::from_slice(body)
                .map_err(|e| GridError::InvalidRequest(format!("malformed JSON body: {e}")))?;
            Ok(Payload::Json(value))
        } else {
            let pairs = url::form_urlencoded::parse(body).into_owned().collect();
            Ok(Payload::Form(pairs))
        }
    }

    /// Decode into a validated request descriptor.
    pub fn decode(&self, default_length: u64) -> Result<GridRequest, GridError> {
        match self {
            Payload::Form(pairs) => decode_form(pairs, default_length),
            Payload::Json(value) => decode_json(value, default_length),
        }
    }

    /// Leniently extract the correlation token, so a payload that fails
    /// full decoding still produces an identifiable error response.
    /// Absent or non-numeric tokens read as 0.
    pub fn peek_draw(&self) -> i64 {
        match self {
            Payload::Form(pairs) => pairs
                .iter()
                .find(|(k, _)| k == "draw")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0),
            Payload::Json(value) => value.get("draw").and_then(lenient_i64).unwrap_or(0),
        }
    }
}

fn decode_form(pairs: &[(String, String)], default_length: u64) -> Result<GridRequest, GridError> {
    let map: HashMap<&str, &str> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let draw = map.get("draw").and_then(|v| v.parse().ok()).unwrap_or(0);
    let start = decode_start(map.get("start").and_then(|v| v.parse::<i64>().ok()));
    let length = decode_length(map.get("length").copied().map(str::to_string), default_length)?;
    let search = map.get("search[value]").copied().unwrap_or("").to_string();

    // Columns are a dense 0..n sequence; the first gap ends the list.
    let mut columns = Vec::new();
    for i in 0.. {
        let Some(data) = map.get(format!("columns[{i}][data]").as_str()) else {
            break;
        };
        columns.push(ColumnSpec {
            data: (*data).to_string(),
            searchable: form_bool(map.get(format!("columns[{i}][searchable]").as_str())),
            orderable: form_bool(map.get(format!("columns[{i}][orderable]").as_str())),
            search: map
                .get(format!("columns[{i}][search][value]").as_str())
                .copied()
                .unwrap_or("")
                .to_string(),
            exact: form_bool(map.get(format!("columns[{i}][search][exact]").as_str())),
        });
    }

    let mut order = Vec::new();
    for j in 0.. {
        let Some(raw) = map.get(format!("order[{j}][column]").as_str()) else {
            break;
        };
        let dir = decode_dir(map.get(format!("order[{j}][dir]").as_str()).copied());
        push_sort_rule(&mut order, raw.parse().ok(), dir, columns.len());
    }

    let extra = pairs
        .iter()
        .filter(|(k, _)| !is_protocol_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(GridRequest {
        draw,
        start,
        length,
        search,
        columns,
        order,
        extra,
    })
}

fn decode_json(value: &JsonValue, default_length: u64) -> Result<GridRequest, GridError> {
    let Some(obj) = value.as_object() else {
        return Err(GridError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    };

    let draw = obj.get("draw").and_then(lenient_i64).unwrap_or(0);
    let start = decode_start(obj.get("start").and_then(lenient_i64));
    let length = decode_length(
        obj.get("length").map(|v| match v {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }),
        default_length,
    )?;
    let search = obj
        .get("search")
        .and_then(|s| s.get("value"))
        .and_then(JsonValue::as_str)
        .unwrap_or("")
        .to_string();

    let columns: Vec<ColumnSpec> = obj
        .get("columns")
        .and_then(JsonValue::as_array)
        .map(|cols| {
            cols.iter()
                .map(|c| ColumnSpec {
                    data: c
                        .get("data")
                        .and_then(JsonValue::as_str)
                        .unwrap_or("")
                        .to_string(),
                    searchable: lenient_bool(c.get("searchable")),
                    orderable: lenient_bool(c.get("orderable")),
                    search: c
                        .get("search")
                        .and_then(|s| s.get("value"))
                        .and_then(JsonValue::as_str)
                        .unwrap_or("")
                        .to_string(),
                    exact: lenient_bool(c.get("search").and_then(|s| s.get("exact"))),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut order = Vec::new();
    if let Some(rules) = obj.get("order").and_then(JsonValue::as_array) {
        for rule in rules {
            let index = rule
                .get("column")
                .and_then(lenient_i64)
                .and_then(|i| usize::try_from(i).ok());
            let dir = decode_dir(rule.get("dir").and_then(JsonValue::as_str));
            push_sort_rule(&mut order, index, dir, columns.len());
        }
    }

    // Top-level scalars outside the protocol are retained for domain filters.
    let extra = obj
        .iter()
        .filter(|(k, _)| {
            !matches!(
                k.as_str(),
                "draw" | "start" | "length" | "search" | "columns" | "order"
            )
        })
        .filter_map(|(k, v)| scalar_string(v).map(|s| (k.clone(), s)))
        .collect();

    Ok(GridRequest {
        draw,
        start,
        length,
        search,
        columns,
        order,
        extra,
    })
}

/// Negative offsets are clamped to 0 rather than rejected.
fn decode_start(raw: Option<i64>) -> u64 {
    raw.unwrap_or(0).max(0) as u64
}

/// Absent or non-numeric lengths fall back to the configured default;
/// `-1` is the "all rows" sentinel; any other negative value is a client
/// error with no safe default.
fn decode_length(raw: Option<String>, default_length: u64) -> Result<PageLength, GridError> {
    match raw.as_deref().map(str::trim).map(str::parse::<i64>) {
        None | Some(Err(_)) => Ok(PageLength::Limit(default_length)),
        Some(Ok(-1)) => Ok(PageLength::All),
        Some(Ok(n)) if n >= 0 => Ok(PageLength::Limit(n as u64)),
        Some(Ok(n)) => Err(GridError::InvalidRequest(format!(
            "page length {n} is negative and not the -1 sentinel"
        ))),
    }
}

fn decode_dir(raw: Option<&str>) -> SortDirection {
    match raw {
        Some("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    }
}

/// Sort rules referencing columns outside the descriptor are dropped
/// silently: the client's column set may have changed since page load.
fn push_sort_rule(
    order: &mut Vec<SortRule>,
    index: Option<usize>,
    dir: SortDirection,
    column_count: usize,
) {
    match index {
        Some(column) if column < column_count => order.push(SortRule { column, dir }),
        Some(column) => {
            tracing::debug!(column, column_count, "dropping out-of-range sort rule");
        }
        None => tracing::debug!("dropping sort rule with non-numeric column index"),
    }
}

fn form_bool(raw: Option<&&str>) -> bool {
    matches!(raw, Some(&"true"))
}

fn lenient_bool(value: Option<&JsonValue>) -> bool {
    match value {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::String(s)) => s == "true",
        _ => false,
    }
}

fn lenient_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_protocol_key(key: &str) -> bool {
    matches!(key, "draw" | "start" | "length")
        || key.starts_with("search[")
        || key.starts_with("columns[")
        || key.starts_with("order[")
}
