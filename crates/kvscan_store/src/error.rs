//! Error types for the store access layer.

use std::path::PathBuf;
use thiserror::Error;

/// Store operation result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be opened (missing path, not a store file,
    /// version mismatch).
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: redb::DatabaseError,
    },

    /// The store contains no tables to scan.
    #[error("store at {path} contains no tables")]
    NoTables { path: PathBuf },

    /// The store contains more than one table and none was selected.
    #[error("store contains multiple tables ({names}); select one by name")]
    AmbiguousTable { names: String },

    /// The selected table could not be opened (missing, or its key/value
    /// types are not plain byte strings).
    #[error("failed to open table '{name}': {source}")]
    Table {
        name: String,
        #[source]
        source: redb::TableError,
    },

    /// Transaction error while starting a read.
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Storage-level error while reading (mid-scan failure).
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// IO error (mid-scan read failure).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store handle failed to close cleanly.
    #[error("failed to close store: {0}")]
    Close(String),
}
