//! Response shaping.
//!
//! Applies registered display transforms to the fetched page, assembles
//! the wire-format result, and provides the client-side correlation
//! contract (`DrawGate`). Transforms run after filtering, sorting, and
//! paging: they change how a cell renders, never which rows match or in
//! what order.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::Value as JsonValue;

use super::types::GridResponse;

/// A pure per-field display transform: raw stored value in, display
/// value out.
pub type Transform = dyn Fn(&JsonValue) -> JsonValue + Send + Sync;

/// Assemble a success page, transforming registered fields in place.
pub(crate) fn build(
    draw: i64,
    records_total: u64,
    records_filtered: u64,
    mut rows: Vec<JsonValue>,
    transforms: &HashMap<String, Arc<Transform>>,
) -> GridResponse {
    if !transforms.is_empty() {
        for row in &mut rows {
            let Some(object) = row.as_object_mut() else {
                continue;
            };
            for (field, transform) in transforms {
                if let Some(value) = object.get(field) {
                    let rendered = transform(value);
                    object.insert(field.clone(), rendered);
                }
            }
        }
    }

    GridResponse {
        draw,
        records_total,
        records_filtered,
        data: rows,
        error: None,
    }
}

/// Render a numeric value as a currency string: thousands separators
/// and two decimals (`57800` → `"57,800.00"`). Non-numeric values pass
/// through untouched.
pub fn currency(value: &JsonValue) -> JsonValue {
    let number = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match number {
        Some(v) => JsonValue::String(format_currency(v)),
        None => value.clone(),
    }
}

/// Render a date or date-time value as `YYYY-MM-DD`. Values that do not
/// look like an ISO date pass through untouched.
pub fn iso_date(value: &JsonValue) -> JsonValue {
    let Some(s) = value.as_str() else {
        return value.clone();
    };
    match s.get(..10) {
        Some(prefix) if is_iso_date_prefix(prefix) => JsonValue::String(prefix.to_string()),
        _ => value.clone(),
    }
}

fn is_iso_date_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}

fn format_currency(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Client-side correlation contract.
///
/// The UI allocates a token per dispatched request and discards any
/// response whose echoed token is older than the most recently
/// dispatched one, so a slow, stale response never overwrites newer
/// state. The engine only guarantees the token is echoed unmodified;
/// enforcement lives here, with the caller.
#[derive(Debug, Default)]
pub struct DrawGate {
    latest: AtomicI64,
}

impl DrawGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next correlation token for an outgoing request.
    pub fn issue(&self) -> i64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record an externally-assigned token as dispatched.
    pub fn dispatched(&self, draw: i64) {
        self.latest.fetch_max(draw, Ordering::SeqCst);
    }

    /// Whether a received response is current enough to apply. Responses
    /// older than the most recently dispatched token must be discarded.
    pub fn accept(&self, response: &GridResponse) -> bool {
        response.draw >= self.latest.load(Ordering::SeqCst)
    }
}
