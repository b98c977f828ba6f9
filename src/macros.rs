/// Builds a [`Record`](crate::Record) from `field => value` pairs.
///
/// ```
/// let record = mapsql::record! { "name" => "Alice", "age" => 30 };
/// assert_eq!(record.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Record::new()$(.with($key, $value))+
    };
}

/// Builds a `Vec<SqlValue>` of positional arguments from mixed Rust values.
///
/// ```
/// use mapsql::SqlValue;
///
/// let args = mapsql::sql_args!["Alice", 30];
/// assert_eq!(args, vec![SqlValue::from("Alice"), SqlValue::Int(30)]);
/// ```
#[macro_export]
macro_rules! sql_args {
    () => {
        ::std::vec::Vec::<$crate::SqlValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::SqlValue::from($value)),+]
    };
}
