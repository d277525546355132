use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

/// One archival record. `fields` is schemaless: a fixed subset of keys
/// (`Name`, `City`, `Country`, `Creation`, `Closure`, ...) carries defined
/// semantics, everything else is passed through untouched.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Record {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

/// Lowercased/trimmed view of one record's fields, kept as a side table
/// parallel to the canonical collection. Rebuilt wholesale whenever the
/// collection is (re)set, never patched in place.
#[derive(Clone, Debug, Default)]
pub struct NormalizedRecord {
    pub fields: HashMap<String, String>,
}

impl Record {
    /// Display text of a field value, or `None` for absent/null values.
    pub fn field_text(&self, key: &str) -> Option<String> {
        value_text(self.fields.get(key)?)
    }

    /// Parses a field as a year. Non-numeric values count as absent.
    pub fn field_year(&self, key: &str) -> Option<i32> {
        match self.fields.get(key)? {
            Value::Number(number) => number.as_i64().and_then(|year| i32::try_from(year).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Featured records render larger and win ambiguous picks. Accepts the
    /// source data's three spellings of truth: `true`, `"true"`, `"True"`.
    pub fn is_featured(&self) -> bool {
        ["featured", "Featured"]
            .iter()
            .filter_map(|key| self.fields.get(*key))
            .any(|value| match value {
                Value::Bool(flag) => *flag,
                Value::String(text) => text == "true" || text == "True",
                _ => false,
            })
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => None,
    }
}

/// Precomputes the lowercase/trimmed view of every field of every record.
/// Total: absent and null values normalize to the empty string, never an
/// error. Recomputed in full on every collection change.
pub fn normalize(collection: &[Record]) -> Vec<NormalizedRecord> {
    collection
        .iter()
        .map(|record| {
            let fields = record
                .fields
                .iter()
                .map(|(key, value)| {
                    let normalized = value_text(value)
                        .map(|text| text.trim().to_lowercase())
                        .unwrap_or_default();
                    (key.clone(), normalized)
                })
                .collect();
            NormalizedRecord { fields }
        })
        .collect()
}

/// Parses raw JSON from the record source. Accepts either a bare array of
/// records or the API envelope `{"records": [...]}`. An empty array is valid
/// output ("no data yet"), not an error.
pub fn parse_records(raw: &str) -> Result<Vec<Record>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON from record source")?;

    let entries = match &parsed {
        Value::Array(_) => parsed.clone(),
        Value::Object(object) => object
            .get("records")
            .cloned()
            .ok_or_else(|| anyhow!("record source object has no 'records' array"))?,
        _ => return Err(anyhow!("unexpected JSON type from record source")),
    };

    serde_json::from_value(entries).context("could not parse record entries")
}

/// Key-value store contract the caller may satisfy with persistent storage to
/// skip a re-fetch. The engine itself never requires it; cached payloads are
/// re-ingested through [`parse_records`] exactly like a fresh fetch.
pub trait RecordCache {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn clear(&mut self);
}
