use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields coerced to floating point instead of text.
pub const SALARY_FIELDS: [&str; 2] = ["minimum_salary", "maximum_salary"];

/// Request body for the paginated listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PageRequest {
    pub current: u32,
    #[serde(rename = "rowCount")]
    pub row_count: u32,
    pub sort: Value,
}

impl PageRequest {
    /// Server-determined sort order; pagination correctness only depends on
    /// an empty page signalling exhaustion, not on this ordering.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            current: page,
            row_count: page_size,
            sort: serde_json::json!({ "created_at": "desc" }),
        }
    }
}

/// Response envelope for the paginated listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    pub rows: Vec<IndexMap<String, Value>>,
}

/// One normalized listing field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Textual form, as written to the snapshot and to attribute rows.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format!("{}", n),
        }
    }
}

/// One job posting as returned by the source API, after normalization.
///
/// Field order is preserved from the API response; the baseline snapshot
/// derives its column set from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawListing {
    fields: IndexMap<String, FieldValue>,
}

impl RawListing {
    /// Normalize a raw API row: nulls become empty strings, salary fields
    /// become floats (0.0 when coercion fails), everything else becomes its
    /// textual representation.
    pub fn from_api_row(row: IndexMap<String, Value>) -> Self {
        let mut fields = IndexMap::with_capacity(row.len());
        for (key, value) in row {
            let normalized = if SALARY_FIELDS.contains(&key.as_str()) {
                FieldValue::Number(coerce_salary(&value))
            } else {
                FieldValue::Text(scalar_text(&value))
            };
            fields.insert(key, normalized);
        }
        Self { fields }
    }

    /// Build a listing from already-normalized fields (baseline load, tests).
    pub fn from_fields(fields: IndexMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    /// Globally unique listing identifier, compared as text.
    pub fn id(&self) -> &str {
        self.text("id")
    }

    /// Textual value of a field; empty string when absent or numeric.
    pub fn text(&self, key: &str) -> &str {
        self.fields
            .get(key)
            .and_then(FieldValue::as_str)
            .unwrap_or("")
    }

    /// Numeric value of a field, 0.0 when absent or unparseable.
    pub fn number(&self, key: &str) -> f64 {
        match self.fields.get(key) {
            Some(FieldValue::Number(n)) => *n,
            Some(FieldValue::Text(s)) => s.trim().parse().unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Field names in API order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Textual form of a field for serialization; empty string when absent.
    pub fn render_field(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(FieldValue::render)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Nested values do not occur in this API; keep them round-trippable.
        other => other.to_string(),
    }
}

fn coerce_salary(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: Vec<(&str, Value)>) -> IndexMap<String, Value> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn nulls_normalize_to_empty_strings() {
        let listing = RawListing::from_api_row(row(vec![
            ("id", json!(7)),
            ("description", Value::Null),
        ]));
        assert_eq!(listing.text("description"), "");
    }

    #[test]
    fn numeric_id_is_exposed_as_text() {
        let listing = RawListing::from_api_row(row(vec![("id", json!(42))]));
        assert_eq!(listing.id(), "42");
    }

    #[test]
    fn salary_strings_coerce_to_floats() {
        let listing = RawListing::from_api_row(row(vec![
            ("minimum_salary", json!("3500.5")),
            ("maximum_salary", json!(4000)),
        ]));
        assert_eq!(listing.number("minimum_salary"), 3500.5);
        assert_eq!(listing.number("maximum_salary"), 4000.0);
    }

    #[test]
    fn unparseable_salary_falls_back_to_zero() {
        let listing = RawListing::from_api_row(row(vec![
            ("minimum_salary", json!("abc")),
            ("maximum_salary", Value::Null),
        ]));
        assert_eq!(listing.number("minimum_salary"), 0.0);
        assert_eq!(listing.number("maximum_salary"), 0.0);
    }

    #[test]
    fn field_order_follows_the_api_row() {
        let listing = RawListing::from_api_row(row(vec![
            ("id", json!(1)),
            ("occupation", json!("welder")),
            ("created_at", json!("2025-01-01")),
        ]));
        let names: Vec<&str> = listing.field_names().collect();
        assert_eq!(names, vec!["id", "occupation", "created_at"]);
    }

    #[test]
    fn render_field_formats_numbers_without_trailing_zeroes() {
        let listing = RawListing::from_api_row(row(vec![(
            "maximum_salary",
            json!(4500.0),
        )]));
        assert_eq!(listing.render_field("maximum_salary"), "4500");
        assert_eq!(listing.render_field("missing"), "");
    }
}
