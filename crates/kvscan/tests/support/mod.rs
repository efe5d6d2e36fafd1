//! Shared fixtures for integration tests.

use redb::{Database, TableDefinition};
use std::path::{Path, PathBuf};

pub const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("records");

/// Create a redb store under `dir` holding the given entries.
pub fn create_store(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("store.redb");
    let db = Database::create(&path).expect("create store");
    let txn = db.begin_write().expect("begin write");
    {
        let mut table = txn.open_table(TABLE).expect("open table");
        for (key, value) in entries {
            table
                .insert(key.as_bytes(), value.as_bytes())
                .expect("insert entry");
        }
    }
    txn.commit().expect("commit");
    path
}

/// The `a..e` identity store most scenarios use.
pub fn identity_store(dir: &Path) -> PathBuf {
    create_store(
        dir,
        &[("a", "a"), ("b", "b"), ("c", "c"), ("d", "d"), ("e", "e")],
    )
}
