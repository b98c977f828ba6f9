mod mysql;
mod sqlite;

pub use self::in_memory_test::{InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedQuery};
pub use self::mysql::MySqlDriver;
pub use self::sqlite::SqliteDriver;
