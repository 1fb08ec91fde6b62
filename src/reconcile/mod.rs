//! Selection reconciliation
//!
//! Decides whether free-typed text designates exactly one record of the
//! materialized window. Matching is an exact comparison after trimming and
//! case folding; prefixes never match and ambiguous text never resolves.

use serde::Serialize;
use serde_json::Value;

use crate::model::Record;

/// A record chosen by the user, implicitly or explicitly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionCandidate {
    /// The selected record
    pub record: Record,

    /// Value of the key field, as text
    pub key: String,
}

impl SelectionCandidate {
    /// Build a candidate keyed on `key_field`.
    ///
    /// Returns `None` when the record has no usable value for the key.
    pub fn from_record(record: Record, key_field: &str) -> Option<Self> {
        let key = record.get(key_field).and_then(value_text)?;
        Some(Self { record, key })
    }

    /// Build a candidate for an explicitly picked record.
    ///
    /// The user chose the row, so a missing key yields an empty one instead
    /// of rejecting the pick.
    pub fn picked(record: Record, key_field: &str) -> Self {
        let key = record
            .get(key_field)
            .and_then(value_text)
            .unwrap_or_default();
        Self { record, key }
    }
}

/// Match `raw_text` against `field` and key the result on the same field.
///
/// # Arguments
/// * `raw_text` - Text typed by the user
/// * `window` - Currently materialized records
/// * `field` - Field compared against and used as key
///
/// # Returns
/// * `Option<SelectionCandidate>` - The only matching record, if exactly one matches
pub fn reconcile(raw_text: &str, window: &[Record], field: &str) -> Option<SelectionCandidate> {
    reconcile_with(raw_text, window, field, field)
}

/// Match `raw_text` against `display_field` and key the result on `key_field`.
pub fn reconcile_with(
    raw_text: &str,
    window: &[Record],
    display_field: &str,
    key_field: &str,
) -> Option<SelectionCandidate> {
    let needle = normalize(raw_text);
    if needle.is_empty() {
        return None;
    }

    let mut matches = window.iter().filter(|record| {
        record
            .get(display_field)
            .and_then(value_text)
            .is_some_and(|text| normalize(&text) == needle)
    });

    let found = matches.next()?;
    if matches.next().is_some() {
        return None;
    }

    SelectionCandidate::from_record(found.clone(), key_field)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Text form of a scalar JSON value; objects, arrays and null have none.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
