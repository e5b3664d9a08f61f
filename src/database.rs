use tracing::debug;

use crate::config::DbConfig;
use crate::connection::ConnectionProvider;
use crate::error::DbError;
use crate::results::{ResultSet, RowRecord};
use crate::sqlite::{BoundStatement, build_result_set, build_typed, last_record, last_typed};
use crate::typed::FromRow;
use crate::types::{NullPolicy, RowValues};

/// One logical database session: a single lazily opened connection plus the
/// statement executor and row mappers that run on it.
///
/// Every call prepares its own statement and releases it before returning.
/// Only the connection outlives a call; [`close`](Self::close) releases it, and
/// later calls fail with `ConnectionError` until [`connect`](Self::connect) is
/// called again. There is no automatic reconnection.
///
/// ```rust
/// use sql_dbutils::prelude::*;
///
/// # fn main() -> Result<(), DbError> {
/// let mut db = Database::open(DbConfig::in_memory())?;
/// db.execute_batch("CREATE TABLE person (id INTEGER, name TEXT);")?;
/// db.execute("INSERT INTO person VALUES (?1, ?2)", &row_params![7, "Ana"])?;
/// let row = db.query_one("SELECT name FROM person WHERE id = ?", &row_params![7])?;
/// assert_eq!(row.unwrap().get("name").and_then(RowValues::as_text), Some("Ana"));
/// db.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database {
    provider: ConnectionProvider,
    null_policy: NullPolicy,
}

impl Database {
    /// Build a session without connecting yet.
    #[must_use]
    pub fn new(config: DbConfig) -> Self {
        let null_policy = config.null_policy;
        Self {
            provider: ConnectionProvider::new(config),
            null_policy,
        }
    }

    /// Build a session and open its connection.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if the connection cannot be opened.
    pub fn open(config: DbConfig) -> Result<Self, DbError> {
        let mut db = Self::new(config);
        db.connect()?;
        Ok(db)
    }

    /// Open the connection if it is not open yet. This is also how a closed
    /// session is reopened.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if the driver is unknown or the database
    /// cannot be opened.
    pub fn connect(&mut self) -> Result<(), DbError> {
        self.provider.connect().map(|_| ())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.provider.is_connected()
    }

    #[must_use]
    pub fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }

    #[must_use]
    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    /// Direct access to the underlying rusqlite connection, opening it on first use.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if the session is closed or the connection
    /// cannot be opened.
    pub fn raw_connection(&mut self) -> Result<&rusqlite::Connection, DbError> {
        self.provider.connection()
    }

    fn prepare(&mut self, sql: &str, params: &[RowValues]) -> Result<BoundStatement<'_>, DbError> {
        let conn = self.provider.connection()?;
        let mut stmt = BoundStatement::prepare(conn, sql)?;
        stmt.bind(params)?;
        Ok(stmt)
    }

    /// Run an INSERT/UPDATE/DELETE (or DDL) and return the affected-row count.
    ///
    /// # Errors
    /// Returns `DbError::BindingError` if there are more parameters than placeholders,
    /// `DbError::StatementError` if the database rejects the statement.
    pub fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, DbError> {
        self.prepare(sql, params)?.execute()
    }

    /// Run several parameterless statements separated by `;`.
    ///
    /// # Errors
    /// Returns `DbError::StatementError` on the first statement that fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), DbError> {
        debug!(sql, "executing batch");
        self.provider.connection()?.execute_batch(sql)?;
        Ok(())
    }

    /// Run a query and return the last row read as a record, or `None` when the
    /// query produced no rows. Cardinality is not checked.
    ///
    /// # Errors
    /// Returns `DbError::BindingError` or `DbError::StatementError`.
    pub fn query_one(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Option<RowRecord>, DbError> {
        let policy = self.null_policy;
        last_record(self.prepare(sql, params)?, policy)
    }

    /// Run a query and return every row as a record, in cursor order.
    ///
    /// # Errors
    /// Returns `DbError::BindingError` or `DbError::StatementError`.
    pub fn query_many(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultSet, DbError> {
        let policy = self.null_policy;
        build_result_set(self.prepare(sql, params)?, policy)
    }

    /// Run a query and map the last row read into a new `T`.
    ///
    /// # Errors
    /// Returns `DbError::MappingError` if a column has no member of the same name on
    /// `T` or a value does not fit its member, `DbError::InstantiationError` if `T`
    /// cannot be created, and the errors of [`query_one`](Self::query_one).
    pub fn query_one_typed<T: FromRow>(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Option<T>, DbError> {
        last_typed(self.prepare(sql, params)?)
    }

    /// Run a query and map every row into its own `T`, in cursor order.
    ///
    /// # Errors
    /// Same as [`query_one_typed`](Self::query_one_typed).
    pub fn query_many_typed<T: FromRow>(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Vec<T>, DbError> {
        build_typed(self.prepare(sql, params)?)
    }

    /// Release the connection. Never fails; safe to call more than once.
    pub fn close(&mut self) {
        self.provider.close();
    }
}
