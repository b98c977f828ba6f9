mod record;
mod row;
mod sql_value;

pub use record::Record;
pub use row::{format_to_string, ExecResult, QueryResult, RawQueryResult, Row};
pub use sql_value::SqlValue;
