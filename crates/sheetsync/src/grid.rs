//! Sparse local mirror of one sheet's cell values.

use std::collections::HashMap;

use crate::types::{Dimension, ValueRange};

/// Cell values keyed by 1-based `(column, row)`.
///
/// Unset coordinates read as the empty string, and writing an empty string
/// removes the entry, so the map only ever holds non-empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellGrid {
    cells: HashMap<(u32, u32), String>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: u32, row: u32) -> &str {
        self.cells.get(&(column, row)).map_or("", String::as_str)
    }

    pub fn set(&mut self, column: u32, row: u32, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&(column, row));
        } else {
            self.cells.insert((column, row), value);
        }
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Replaces the whole grid with the contents of a bulk read, whichever
    /// way round the response is laid out.
    pub fn load(&mut self, range: &ValueRange) {
        self.cells.clear();
        for (outer, inner) in (1u32..).zip(&range.values) {
            for (position, value) in (1u32..).zip(inner) {
                let (column, row) = match range.major_dimension {
                    Dimension::Rows => (position, outer),
                    Dimension::Columns => (outer, position),
                };
                self.set(column, row, cell_text(value));
            }
        }
    }

    /// Writes a block of values whose top-left corner is `origin`.
    pub fn write_block(&mut self, origin: (u32, u32), dimension: Dimension, values: &[Vec<String>]) {
        let (left, top) = origin;
        for (outer, inner) in (0u32..).zip(values) {
            for (position, value) in (0u32..).zip(inner) {
                let (column, row) = match dimension {
                    Dimension::Rows => (left + position, top + outer),
                    Dimension::Columns => (left + outer, top + position),
                };
                self.set(column, row, value.as_str());
            }
        }
    }

    /// Dense view of one row across `column_count` columns.
    pub fn row(&self, row: u32, column_count: u32) -> Vec<String> {
        (1..=column_count)
            .map(|column| self.get(column, row).to_string())
            .collect()
    }

    /// Dense view of one column across `row_count` rows.
    pub fn column(&self, column: u32, row_count: u32) -> Vec<String> {
        (1..=row_count)
            .map(|row| self.get(column, row).to_string())
            .collect()
    }

    /// Drops every cell outside `column_count` x `row_count`.
    pub fn truncate(&mut self, column_count: u32, row_count: u32) {
        self.cells
            .retain(|&(column, row), _| column <= column_count && row <= row_count);
    }

    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), &str)> {
        self.cells.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Renders a JSON cell value the way it is shown in the sheet.
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}
