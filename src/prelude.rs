//! Convenient imports for common functionality.

pub use crate::config::{DbConfig, DbConfigBuilder};
pub use crate::database::Database;
pub use crate::error::DbError;
pub use crate::results::{ResultSet, RowRecord};
pub use crate::typed::{FieldSetter, FromRow, FromRowValue};
pub use crate::types::{DatabaseType, NullPolicy, RowValues};
pub use crate::{impl_from_row, row_params};
