use std::fmt;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::config::DbConfig;
use crate::error::DbError;
use crate::types::DatabaseType;

/// Opens and holds the single connection for a session.
///
/// The driver identifier is resolved at construction. An unknown driver is
/// logged but does not fail construction; every later `connect` fails instead.
/// After [`close`](Self::close) the provider stays closed until `connect` is
/// called again.
pub struct ConnectionProvider {
    config: DbConfig,
    driver: Option<DatabaseType>,
    conn: Option<Connection>,
    closed: bool,
}

impl ConnectionProvider {
    #[must_use]
    pub fn new(config: DbConfig) -> Self {
        let driver = DatabaseType::lookup(&config.driver);
        match driver {
            Some(kind) => info!(driver = ?kind, "database driver registered"),
            None => error!(driver = %config.driver, "database driver registration failed"),
        }
        Self {
            config,
            driver,
            conn: None,
            closed: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    #[must_use]
    pub fn driver(&self) -> Option<DatabaseType> {
        self.driver
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Return the held connection, opening it if none is held. Reopens a closed provider.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if the driver is unknown or the database
    /// cannot be opened.
    pub fn connect(&mut self) -> Result<&Connection, DbError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.open()?,
        };
        self.closed = false;
        Ok(self.conn.insert(conn))
    }

    /// Connection for the executor: opened on first use, but never reopened after `close`.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` once the provider has been closed, or when
    /// opening fails.
    pub fn connection(&mut self) -> Result<&Connection, DbError> {
        if self.closed {
            return Err(DbError::ConnectionError(
                "connection has been closed; call connect() to reopen".into(),
            ));
        }
        self.connect()
    }

    fn open(&self) -> Result<Connection, DbError> {
        let Some(driver) = self.driver else {
            return Err(DbError::ConnectionError(format!(
                "no driver available for `{}`",
                self.config.driver
            )));
        };
        match driver {
            DatabaseType::Sqlite => self.open_sqlite(),
        }
    }

    fn open_sqlite(&self) -> Result<Connection, DbError> {
        let path = self.config.database_path();
        if !self.config.username.is_empty() {
            debug!(username = %self.config.username, "sqlite ignores credentials");
        }
        let conn = Connection::open(&path).map_err(|e| {
            DbError::ConnectionError(format!("cannot open sqlite database {path}: {e}"))
        })?;

        if let Some(millis) = self.config.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(millis))
                .map_err(|e| DbError::ConnectionError(format!("busy timeout: {e}")))?;
        }
        if self.config.wal && !self.config.is_in_memory() {
            let mode: String = conn
                .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
                .map_err(|e| DbError::ConnectionError(format!("enable WAL: {e}")))?;
            debug!(journal_mode = %mode, "journal mode set");
        }

        info!(path = %path, "sqlite connection opened");
        Ok(conn)
    }

    /// Release the held connection. Failures are logged, never returned, and
    /// calling this without a connection does nothing.
    pub fn close(&mut self) {
        self.closed = true;
        let Some(conn) = self.conn.take() else {
            debug!("close called without an open connection");
            return;
        };
        match conn.close() {
            Ok(()) => info!("sqlite connection closed"),
            Err((conn, err)) => {
                warn!(error = %err, "sqlite connection close failed; dropping handle");
                drop(conn);
            }
        }
    }
}

impl fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("config", &self.config)
            .field("driver", &self.driver)
            .field("connected", &self.is_connected())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_driver_fails_on_connect_not_construction() {
        let cfg = DbConfig::builder(":memory:", "")
            .driver("com.mysql.jdbc.Driver")
            .finish();
        let mut provider = ConnectionProvider::new(cfg);
        assert_eq!(provider.driver(), None);
        let err = provider.connect().unwrap_err();
        assert!(matches!(err, DbError::ConnectionError(_)));
        assert!(!provider.is_connected());
    }

    #[test]
    fn connection_is_reused_until_closed() {
        let mut provider = ConnectionProvider::new(DbConfig::in_memory());
        provider
            .connect()
            .unwrap()
            .execute_batch("CREATE TABLE t (x INTEGER);")
            .unwrap();
        // Same in-memory database, so the table is still there.
        let count: i64 = provider
            .connect()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        provider.close();
        assert!(!provider.is_connected());
        provider.close();
        assert!(matches!(
            provider.connection(),
            Err(DbError::ConnectionError(_))
        ));
        assert!(provider.connect().is_ok());
        assert!(provider.connection().is_ok());
    }
}
