use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Binding error: {0}")]
    BindingError(String),

    #[error("Statement error: {0}")]
    StatementError(#[source] rusqlite::Error),

    #[error("Mapping error: {0}")]
    MappingError(String),

    #[error("Instantiation error: {0}")]
    InstantiationError(String),
}

impl DbError {
    /// True for failures that came back from the database while preparing or running SQL.
    #[must_use]
    pub fn is_statement_error(&self) -> bool {
        matches!(self, DbError::StatementError(_))
    }
}

/// Parameter-count and out-of-range failures are binding problems; everything else the
/// driver reports while preparing or running a statement is a statement failure.
impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::InvalidParameterCount(given, expected) => DbError::BindingError(
                format!("{given} parameters supplied, statement expects {expected}"),
            ),
            rusqlite::Error::InvalidParameterName(name) => {
                DbError::BindingError(format!("unknown parameter name {name}"))
            }
            rusqlite::Error::SqliteFailure(ffi_err, _)
                if ffi_err.code == rusqlite::ErrorCode::ParameterOutOfRange =>
            {
                DbError::BindingError(format!("parameter index out of range: {ffi_err}"))
            }
            other => DbError::StatementError(other),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::ConfigError(format!("invalid configuration: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_count_maps_to_binding_error() {
        let err: DbError = rusqlite::Error::InvalidParameterCount(3, 2).into();
        assert!(matches!(err, DbError::BindingError(_)));
        assert_eq!(
            err.to_string(),
            "Binding error: 3 parameters supplied, statement expects 2"
        );
    }

    #[test]
    fn other_driver_errors_map_to_statement_error() {
        let err: DbError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_statement_error());
    }
}
