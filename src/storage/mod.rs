//! `SQLite` persistence for tickets, users, notifications and attachment
//! metadata.

pub mod schema;
pub mod sqlite;

pub use self::sqlite::SqliteStore;
