//! Mapping result rows onto caller-declared types.
//!
//! A type opts in by implementing [`FromRow`], normally through
//! [`impl_from_row!`](crate::impl_from_row). The trait exposes one setter per
//! member, looked up by exact column name. [`RowMapper`] resolves those setters
//! once per query and applies them to every row.

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::DbError;
use crate::results::ColumnIndex;
use crate::types::RowValues;

mod macros;

/// Assigns one column's value into the matching member.
pub type FieldSetter<T> = fn(&mut T, RowValues) -> Result<(), DbError>;

/// A type that can be built from a result row.
pub trait FromRow: Sized {
    /// Allocate a fresh, empty instance.
    ///
    /// # Errors
    /// Returns `DbError::InstantiationError` if the type cannot be constructed.
    fn instantiate() -> Result<Self, DbError>;

    /// Setter for the member named exactly `column`, or `None` if there is no such member.
    fn field_setter(column: &str) -> Option<FieldSetter<Self>>;
}

/// Conversion from a column value into a member type.
///
/// Errors are plain messages; [`convert_field`] adds the column name.
pub trait FromRowValue: Sized {
    /// # Errors
    /// Returns a description of the mismatch when `value` does not fit `Self`.
    fn from_row_value(value: RowValues) -> Result<Self, String>;
}

fn mismatch(expected: &str, found: &RowValues) -> String {
    format!("expected {expected}, found {}", found.kind())
}

impl FromRowValue for RowValues {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        Ok(value)
    }
}

impl FromRowValue for i64 {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        match value {
            RowValues::Int(i) => Ok(i),
            RowValues::Bool(b) => Ok(i64::from(b)),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromRowValue for i32 {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        let wide = i64::from_row_value(value)?;
        i32::try_from(wide).map_err(|_| format!("integer {wide} out of range for i32"))
    }
}

impl FromRowValue for u32 {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        let wide = i64::from_row_value(value)?;
        u32::try_from(wide).map_err(|_| format!("integer {wide} out of range for u32"))
    }
}

impl FromRowValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        match value {
            RowValues::Float(f) => Ok(f),
            RowValues::Int(i) => Ok(i as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromRowValue for bool {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        value
            .as_bool()
            .copied()
            .ok_or_else(|| mismatch("bool or 0/1 integer", &value))
    }
}

/// NULL becomes the empty string, the same sentinel row records use.
impl FromRowValue for String {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        match value {
            RowValues::Text(s) => Ok(s),
            RowValues::Null => Ok(String::new()),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromRowValue for NaiveDateTime {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch("timestamp", &value))
    }
}

impl FromRowValue for Vec<u8> {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        match value {
            RowValues::Blob(bytes) => Ok(bytes),
            other => Err(mismatch("blob", &other)),
        }
    }
}

impl FromRowValue for JsonValue {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        match value {
            RowValues::JSON(v) => Ok(v),
            RowValues::Null => Ok(JsonValue::Null),
            RowValues::Text(s) => {
                serde_json::from_str(&s).map_err(|e| format!("text is not valid JSON: {e}"))
            }
            other => Err(mismatch("json", &other)),
        }
    }
}

impl<T: FromRowValue> FromRowValue for Option<T> {
    fn from_row_value(value: RowValues) -> Result<Self, String> {
        match value {
            RowValues::Null => Ok(None),
            other => T::from_row_value(other).map(Some),
        }
    }
}

/// Convert `value` for the member backing `column`.
///
/// # Errors
/// Returns `DbError::MappingError` naming the column when the value does not fit.
pub fn convert_field<V: FromRowValue>(column: &str, value: RowValues) -> Result<V, DbError> {
    V::from_row_value(value).map_err(|msg| {
        DbError::MappingError(format!(
            "column `{column}` into {}: {msg}",
            type_name::<V>()
        ))
    })
}

/// Per-query mapping plan: one setter slot per result column.
pub struct RowMapper<T> {
    columns: Arc<ColumnIndex>,
    setters: Vec<Option<FieldSetter<T>>>,
    _target: PhantomData<fn() -> T>,
}

impl<T: FromRow> RowMapper<T> {
    #[must_use]
    pub fn new(columns: Arc<ColumnIndex>) -> Self {
        let setters = columns
            .names()
            .iter()
            .map(|name| T::field_setter(name))
            .collect();
        Self {
            columns,
            setters,
            _target: PhantomData,
        }
    }

    /// Number of columns each row is expected to carry.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Build a new `T` from one row's values, in column order.
    ///
    /// # Errors
    /// Returns `DbError::MappingError` if a column has no matching member or a value
    /// does not convert, and `DbError::InstantiationError` if `T` cannot be created.
    /// The partially populated instance is dropped on error.
    pub fn map_row(&self, values: Vec<RowValues>) -> Result<T, DbError> {
        let mut target = T::instantiate()?;
        for ((name, setter), value) in self
            .columns
            .names()
            .iter()
            .zip(&self.setters)
            .zip(values)
        {
            let setter = setter.ok_or_else(|| {
                DbError::MappingError(format!(
                    "no member named `{name}` on {}",
                    type_name::<T>()
                ))
            })?;
            setter(&mut target, value)?;
        }
        Ok(target)
    }
}
