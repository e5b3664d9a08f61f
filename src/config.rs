use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DbError;
use crate::types::NullPolicy;

const MEMORY_ENDPOINT: &str = ":memory:";

fn default_driver() -> String {
    "sqlite".to_string()
}

/// Connection settings, read once when a [`Database`](crate::Database) is constructed.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct DbConfig {
    /// Directory holding the database file, or `:memory:` / a `file:` URI.
    pub endpoint: String,
    /// Database name; joined under `endpoint` for file databases.
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Driver identifier, e.g. `sqlite`.
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default)]
    pub null_policy: NullPolicy,
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
    #[serde(default)]
    pub wal: bool,
}

impl DbConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            database: database.into(),
            username: String::new(),
            password: String::new(),
            driver: default_driver(),
            null_policy: NullPolicy::default(),
            busy_timeout_ms: None,
            wal: false,
        }
    }

    /// Private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MEMORY_ENDPOINT, "")
    }

    #[must_use]
    pub fn builder(endpoint: impl Into<String>, database: impl Into<String>) -> DbConfigBuilder {
        DbConfigBuilder::new(endpoint, database)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    /// Returns `DbError::ConfigError` if the JSON is malformed or misses `endpoint`.
    pub fn from_json_str(json: &str) -> Result<Self, DbError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    /// Returns `DbError::ConfigError` if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Resolve endpoint and database name into what the driver opens.
    ///
    /// In-memory endpoints and `file:` URIs are passed through. Otherwise the
    /// database name is placed under the endpoint directory, gaining a `.db`
    /// extension when it has none.
    #[must_use]
    pub fn database_path(&self) -> String {
        let endpoint = self.endpoint.trim();
        if endpoint == MEMORY_ENDPOINT || endpoint.starts_with("file:") {
            return endpoint.to_string();
        }
        if self.database.is_empty() {
            return endpoint.to_string();
        }
        let mut path = PathBuf::from(endpoint);
        path.push(&self.database);
        if path.extension().is_none() {
            path.set_extension("db");
        }
        path.to_string_lossy().into_owned()
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        let path = self.database_path();
        path == MEMORY_ENDPOINT || path.starts_with("file::memory:") || path.contains("mode=memory")
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("driver", &self.driver)
            .field("null_policy", &self.null_policy)
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .field("wal", &self.wal)
            .finish()
    }
}

/// Fluent builder for [`DbConfig`].
#[derive(Debug, Clone)]
pub struct DbConfigBuilder {
    config: DbConfig,
}

impl DbConfigBuilder {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            config: DbConfig::new(endpoint, database),
        }
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    #[must_use]
    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.config.driver = driver.into();
        self
    }

    #[must_use]
    pub fn null_policy(mut self, policy: NullPolicy) -> Self {
        self.config.null_policy = policy;
        self
    }

    #[must_use]
    pub fn busy_timeout_ms(mut self, millis: u64) -> Self {
        self.config.busy_timeout_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.config.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> DbConfig {
        self.config
    }
}
