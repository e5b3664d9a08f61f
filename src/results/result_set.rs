use std::sync::Arc;

use super::row::{ColumnIndex, RowRecord};
use crate::types::RowValues;

/// Rows returned by a query, in the order the cursor produced them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<RowRecord>,
    columns: Arc<ColumnIndex>,
}

impl ResultSet {
    /// Create an empty result set for the given columns.
    #[must_use]
    pub fn new(columns: Arc<ColumnIndex>) -> Self {
        Self {
            results: Vec::new(),
            columns,
        }
    }

    /// Add a row; values must be in column order.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        self.results
            .push(RowRecord::new(Arc::clone(&self.columns), row_values));
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.columns.names()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowRecord> {
        self.results.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = RowRecord;
    type IntoIter = std::vec::IntoIter<RowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a RowRecord;
    type IntoIter = std::slice::Iter<'a, RowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
