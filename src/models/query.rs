use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tabular answer to a console query, identical for the live and simulated paths.
///
/// Cells are JSON scalars; `Value::Null` is a SQL NULL and must never be
/// confused with an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>, message: Option<String>) -> Self {
        Self { columns, rows, message, elapsed_ms: 0 }
    }

    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
