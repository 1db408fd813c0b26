//! Tabular Result Module
//!
//! In-memory shape of a query result: object rows or array rows of scalars.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single object row (field name -> scalar), in insertion order.
pub type ObjectRow = Map<String, Value>;

/// A single array row (ordered scalars).
pub type ArrayRow = Vec<Value>;

// == Tabular Result ==
/// An ordered sequence of rows in one of the two supported shapes.
///
/// Serializes as a plain JSON array (`[{..}, ..]` or `[[..], ..]`). An empty
/// table carries no shape, so `Objects([])` and `Arrays([])` compare equal and
/// an empty JSON array deserializes as `Objects([])`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TabularResult {
    /// Rows keyed by field name
    Objects(Vec<ObjectRow>),
    /// Rows as positional values
    Arrays(Vec<ArrayRow>),
}

impl TabularResult {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            TabularResult::Objects(rows) => rows.len(),
            TabularResult::Arrays(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts object rows to array rows, keeping each row's field order.
    pub fn to_arrays(&self) -> TabularResult {
        match self {
            TabularResult::Objects(rows) => TabularResult::Arrays(
                rows.iter()
                    .map(|row| row.values().cloned().collect())
                    .collect(),
            ),
            TabularResult::Arrays(rows) => TabularResult::Arrays(rows.clone()),
        }
    }

    /// Returns the table with every scalar rendered as a string.
    ///
    /// This is the form a CSV round trip yields: strings are kept, numbers and
    /// booleans become their text, null becomes the empty string. Nested
    /// values are rendered as JSON text.
    pub fn stringified(&self) -> TabularResult {
        match self {
            TabularResult::Objects(rows) => TabularResult::Objects(
                rows.iter()
                    .map(|row| {
                        row.iter()
                            .map(|(k, v)| (k.clone(), Value::String(scalar_text(v))))
                            .collect()
                    })
                    .collect(),
            ),
            TabularResult::Arrays(rows) => TabularResult::Arrays(
                rows.iter()
                    .map(|row| row.iter().map(|v| Value::String(scalar_text(v))).collect())
                    .collect(),
            ),
        }
    }
}

impl PartialEq for TabularResult {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TabularResult::Objects(a), TabularResult::Objects(b)) => a == b,
            (TabularResult::Arrays(a), TabularResult::Arrays(b)) => a == b,
            _ => self.is_empty() && other.is_empty(),
        }
    }
}

impl From<Vec<ObjectRow>> for TabularResult {
    fn from(rows: Vec<ObjectRow>) -> Self {
        TabularResult::Objects(rows)
    }
}

impl From<Vec<ArrayRow>> for TabularResult {
    fn from(rows: Vec<ArrayRow>) -> Self {
        TabularResult::Arrays(rows)
    }
}

/// Text form of a scalar as written into a CSV field.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
