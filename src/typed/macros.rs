/// Implement [`FromRow`](crate::typed::FromRow) for a `Default` struct by listing the
/// members that receive columns. Each member name is matched against column names
/// exactly.
///
/// ```rust
/// use sql_dbutils::impl_from_row;
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: i64,
///     name: String,
///     email: Option<String>,
/// }
///
/// impl_from_row!(User { id, name, email });
/// ```
#[macro_export]
macro_rules! impl_from_row {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::typed::FromRow for $ty {
            fn instantiate() -> ::std::result::Result<Self, $crate::DbError> {
                ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
            }

            fn field_setter(
                column: &str,
            ) -> ::std::option::Option<$crate::typed::FieldSetter<Self>> {
                match column {
                    $(
                        stringify!($field) => {
                            let setter: $crate::typed::FieldSetter<Self> = |target, value| {
                                target.$field =
                                    $crate::typed::convert_field(stringify!($field), value)?;
                                ::std::result::Result::Ok(())
                            };
                            ::std::option::Option::Some(setter)
                        }
                    )+
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}
