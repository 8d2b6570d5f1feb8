#![allow(dead_code)]

use std::sync::Once;
use tempfile::TempDir;
use ticketry::storage::SqliteStore;

pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        ticketry::logging::init_test_logging();
    });
}

/// In-memory store for tests that never touch the filesystem.
pub fn test_db() -> SqliteStore {
    init_test_logging();
    SqliteStore::open_memory().expect("open in-memory db")
}

/// File-backed store plus the temp dir keeping it alive.
pub fn test_db_with_dir() -> (TempDir, SqliteStore) {
    init_test_logging();
    let dir = TempDir::new().expect("create temp dir");
    let store = SqliteStore::open(&dir.path().join("ticketry.db")).expect("open db");
    (dir, store)
}
