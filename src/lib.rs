//! Synchronous helper for running parameterized SQL over a single connection.
//!
//! [`Database`] owns one lazily opened connection. Mutations return the
//! affected-row count; queries come back as [`RowRecord`]s keyed by column name
//! or as caller types implementing [`FromRow`](typed::FromRow).

pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod prelude;
pub mod results;
pub mod sqlite;
pub mod typed;
pub mod types;

pub use config::{DbConfig, DbConfigBuilder};
pub use connection::ConnectionProvider;
pub use database::Database;
pub use error::DbError;
pub use results::{ResultSet, RowRecord};
pub use typed::{FromRow, FromRowValue};
pub use types::{DatabaseType, NullPolicy, RowValues};
