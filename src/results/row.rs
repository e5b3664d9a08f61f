use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// Column names of one query plus a name-to-position lookup, resolved once per query
/// and shared by every row it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Duplicate names resolve to the right-most column.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, positions }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn position(&self, column_name: &str) -> Option<usize> {
        self.positions.get(column_name).copied()
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

impl Default for ColumnIndex {
    fn default() -> Self {
        ColumnIndex::new(Vec::new())
    }
}

/// One result row, keyed by column name.
///
/// Lookups are exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct RowRecord {
    columns: Arc<ColumnIndex>,
    values: Vec<RowValues>,
}

impl RowRecord {
    /// Create a row from shared column metadata and this row's values.
    #[must_use]
    pub fn new(columns: Arc<ColumnIndex>, values: Vec<RowValues>) -> Self {
        Self { columns, values }
    }

    /// Get a value from the row by column name
    ///
    /// # Returns
    ///
    /// The value at the column, or None if the column wasn't found
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.columns
            .position(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Convert into a plain map. With duplicate column names the right-most value is kept.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, RowValues> {
        self.columns.names().iter().cloned().zip(self.values).collect()
    }
}

impl PartialEq for RowRecord {
    fn eq(&self, other: &Self) -> bool {
        self.columns.names() == other.columns.names() && self.values == other.values
    }
}
