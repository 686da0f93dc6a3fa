//! Tabular query results as served by the warehouse.

use serde::{Deserialize, Serialize};

/// A column-named, string-celled result table.
///
/// Athena serves every value as text, with empty cells standing in for NULL.
/// Typing happens later (see [`crate::trips`]), so this type stays faithful
/// to the wire shape and trivial to fabricate in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTable {
    /// Column names, in result order.
    pub columns: Vec<String>,
    /// Data rows. A row may be shorter than the header when trailing cells
    /// were NULL.
    pub rows: Vec<Vec<String>>,
}

impl QueryTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Position of `name` in the header, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fetch a cell by column position, treating missing and empty cells as NULL.
pub fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
