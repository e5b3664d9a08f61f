use std::sync::Arc;

use rusqlite::{Connection, Row, Statement};
use tracing::{debug, trace, warn};

use super::params::Params;
use crate::error::DbError;
use crate::results::ColumnIndex;
use crate::types::RowValues;

/// A prepared statement scoped to a single call.
///
/// Lifecycle: created `Prepared`, parameters bound, then consumed by
/// [`execute`](Self::execute) or [`query`](Self::query), which finalize it.
/// On an error path the handle is dropped and rusqlite finalizes the
/// statement, so it is released exactly once either way.
pub struct BoundStatement<'conn> {
    stmt: Statement<'conn>,
    sql: String,
}

impl<'conn> BoundStatement<'conn> {
    /// # Errors
    /// Returns `DbError::StatementError` if the SQL does not compile.
    pub fn prepare(conn: &'conn Connection, sql: &str) -> Result<Self, DbError> {
        let stmt = conn.prepare(sql)?;
        debug!(sql, placeholders = stmt.parameter_count(), "statement prepared");
        Ok(Self {
            stmt,
            sql: sql.to_owned(),
        })
    }

    /// Bind `params` positionally, the first value to placeholder 1.
    ///
    /// Supplying more values than placeholders fails. Supplying fewer leaves the
    /// trailing placeholders unbound, which `SQLite` treats as NULL.
    ///
    /// # Errors
    /// Returns `DbError::BindingError` when there are more values than placeholders.
    pub fn bind(&mut self, params: &[RowValues]) -> Result<(), DbError> {
        let expected = self.stmt.parameter_count();
        if params.len() > expected {
            return Err(DbError::BindingError(format!(
                "{} parameters supplied, statement has {expected} placeholders",
                params.len()
            )));
        }
        if params.len() < expected {
            debug!(
                sql = %self.sql,
                supplied = params.len(),
                expected,
                "fewer parameters than placeholders; remaining bind as NULL"
            );
        }
        let converted = Params::convert(params);
        for (offset, value) in converted.as_values().iter().enumerate() {
            self.stmt.raw_bind_parameter(offset + 1, value)?;
        }
        Ok(())
    }

    /// Column metadata for the statement's result, resolved once.
    #[must_use]
    pub fn columns(&self) -> Arc<ColumnIndex> {
        let names = self
            .stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        Arc::new(ColumnIndex::new(names))
    }

    /// Run as a mutation and return the driver-reported affected-row count.
    ///
    /// # Errors
    /// Returns `DbError::StatementError` if the database rejects the statement
    /// or the statement produces rows.
    pub fn execute(mut self) -> Result<usize, DbError> {
        let affected = self.stmt.raw_execute()?;
        debug!(sql = %self.sql, affected, "statement executed");
        self.release();
        Ok(affected)
    }

    /// Run as a query, handing each row to `on_row` in cursor order.
    ///
    /// # Errors
    /// Returns the first error raised by the cursor or by `on_row`.
    pub fn query<F>(mut self, mut on_row: F) -> Result<usize, DbError>
    where
        F: FnMut(&Row<'_>) -> Result<(), DbError>,
    {
        let mut count = 0usize;
        {
            let mut rows = self.stmt.raw_query();
            while let Some(row) = rows.next()? {
                on_row(row)?;
                count += 1;
            }
        }
        debug!(sql = %self.sql, rows = count, "query finished");
        self.release();
        Ok(count)
    }

    fn release(self) {
        let sql = self.sql;
        match self.stmt.finalize() {
            Ok(()) => trace!(sql = %sql, "statement released"),
            Err(err) => warn!(sql = %sql, error = %err, "statement release failed"),
        }
    }
}
