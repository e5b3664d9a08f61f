use std::sync::Arc;

use rusqlite::types::ValueRef;

use super::statement::BoundStatement;
use crate::error::DbError;
use crate::results::{ResultSet, RowRecord};
use crate::typed::{FromRow, RowMapper};
use crate::types::{NullPolicy, RowValues};

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `DbError` if the column index is out of range.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> Result<RowValues, DbError> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => RowValues::Null,
        ValueRef::Integer(i) => RowValues::Int(i),
        ValueRef::Real(f) => RowValues::Float(f),
        ValueRef::Text(bytes) => RowValues::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(b) => RowValues::Blob(b.to_vec()),
    };
    Ok(value)
}

fn extract_row(row: &rusqlite::Row, width: usize) -> Result<Vec<RowValues>, DbError> {
    (0..width).map(|i| sqlite_extract_value(row, i)).collect()
}

fn extract_record_values(
    row: &rusqlite::Row,
    width: usize,
    policy: NullPolicy,
) -> Result<Vec<RowValues>, DbError> {
    Ok(extract_row(row, width)?
        .into_iter()
        .map(|value| policy.apply(value))
        .collect())
}

/// Run a bound query and collect every row into a `ResultSet`.
///
/// # Errors
/// Returns `DbError` if the cursor fails.
pub fn build_result_set(
    stmt: BoundStatement<'_>,
    policy: NullPolicy,
) -> Result<ResultSet, DbError> {
    let columns = stmt.columns();
    let width = columns.len();
    let mut result_set = ResultSet::new(columns);
    stmt.query(|row| {
        result_set.add_row_values(extract_record_values(row, width, policy)?);
        Ok(())
    })?;
    Ok(result_set)
}

/// Run a bound query and keep only the last row read.
///
/// # Errors
/// Returns `DbError` if the cursor fails.
pub fn last_record(
    stmt: BoundStatement<'_>,
    policy: NullPolicy,
) -> Result<Option<RowRecord>, DbError> {
    let columns = stmt.columns();
    let width = columns.len();
    let mut last = None;
    stmt.query(|row| {
        let values = extract_record_values(row, width, policy)?;
        last = Some(RowRecord::new(Arc::clone(&columns), values));
        Ok(())
    })?;
    Ok(last)
}

/// Run a bound query and map every row into a new `T`.
///
/// # Errors
/// Returns `DbError::MappingError` or `DbError::InstantiationError` from the mapper,
/// or the cursor's error.
pub fn build_typed<T: FromRow>(stmt: BoundStatement<'_>) -> Result<Vec<T>, DbError> {
    let mapper = RowMapper::<T>::new(stmt.columns());
    let width = mapper.width();
    let mut out = Vec::new();
    stmt.query(|row| {
        out.push(mapper.map_row(extract_row(row, width)?)?);
        Ok(())
    })?;
    Ok(out)
}

/// Run a bound query, mapping each row into a new `T` and keeping the last one.
///
/// # Errors
/// Same as [`build_typed`].
pub fn last_typed<T: FromRow>(stmt: BoundStatement<'_>) -> Result<Option<T>, DbError> {
    let mapper = RowMapper::<T>::new(stmt.columns());
    let width = mapper.width();
    let mut last = None;
    stmt.query(|row| {
        last = Some(mapper.map_row(extract_row(row, width)?)?);
        Ok(())
    })?;
    Ok(last)
}
