//! redb-backed store.
//!
//! Opens an existing redb database file and scans one table of plain byte
//! keys and values. The table to scan is resolved at open time: a store
//! with a single table needs no selection, otherwise the caller names one.

use crate::error::{Result, StoreError};
use crate::types::{Direction, RawEntry, ScanRequest};
use crate::{EntryScan, Store};
use redb::{Database, ReadableTableMetadata, TableDefinition, TableHandle};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store backed by a redb database file.
pub struct RedbStore {
    db: Database,
    table: String,
    path: PathBuf,
}

impl RedbStore {
    /// Open an existing store and resolve the table to scan.
    ///
    /// `table` may be omitted when the store contains exactly one table.
    pub fn open(path: &Path, table: Option<&str>) -> Result<Self> {
        let db = Database::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let table = match table {
            Some(name) => name.to_string(),
            None => resolve_sole_table(&db, path)?,
        };

        let store = Self {
            db,
            table,
            path: path.to_path_buf(),
        };

        // Fail at open time, not mid-scan, if the table is missing or its
        // key/value types are not byte strings.
        let txn = store.db.begin_read()?;
        let table = store.open_byte_table(&txn)?;
        debug!(
            path = %store.path.display(),
            table = %store.table,
            records = table.len()?,
            "opened store"
        );

        Ok(store)
    }

    /// Name of the table this store scans.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn open_byte_table(
        &self,
        txn: &redb::ReadTransaction,
    ) -> Result<redb::ReadOnlyTable<&'static [u8], &'static [u8]>> {
        let definition = TableDefinition::<&[u8], &[u8]>::new(&self.table);
        txn.open_table(definition).map_err(|source| StoreError::Table {
            name: self.table.clone(),
            source,
        })
    }
}

impl Store for RedbStore {
    fn range_scan(&self, request: &ScanRequest) -> Result<EntryScan<'_>> {
        if request.is_empty_range() {
            return Ok(Box::new(std::iter::empty()));
        }

        let txn = self.db.begin_read()?;
        let table = self.open_byte_table(&txn)?;

        let lower: Bound<&[u8]> = match &request.lower {
            Some(bound) if bound.inclusive => Bound::Included(bound.key.as_slice()),
            Some(bound) => Bound::Excluded(bound.key.as_slice()),
            None => Bound::Unbounded,
        };
        let upper: Bound<&[u8]> = match &request.upper {
            Some(bound) if bound.inclusive => Bound::Included(bound.key.as_slice()),
            Some(bound) => Bound::Excluded(bound.key.as_slice()),
            None => Bound::Unbounded,
        };

        let range = table.range::<&[u8]>((lower, upper))?;
        let ordered: Box<dyn Iterator<Item = _>> = match request.direction {
            Direction::Ascending => Box::new(range),
            Direction::Descending => Box::new(range.rev()),
        };
        let limited: Box<dyn Iterator<Item = _>> = match request.limit {
            Some(limit) => Box::new(ordered.take(limit as usize)),
            None => ordered,
        };

        let fetch_keys = request.fetch_keys;
        let fetch_values = request.fetch_values;
        Ok(Box::new(limited.map(move |item| {
            let (key, value) = item?;
            Ok(RawEntry {
                key: fetch_keys.then(|| key.value().to_vec()),
                value: fetch_values.then(|| value.value().to_vec()),
            })
        })))
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!(path = %self.path.display(), "closing store");
        drop(self.db);
        Ok(())
    }
}

/// Pick the store's only table, or report what is actually there.
fn resolve_sole_table(db: &Database, path: &Path) -> Result<String> {
    let txn = db.begin_read()?;
    let mut names: Vec<String> = txn
        .list_tables()?
        .map(|handle| handle.name().to_string())
        .collect();

    match names.len() {
        0 => Err(StoreError::NoTables {
            path: path.to_path_buf(),
        }),
        1 => Ok(names.remove(0)),
        _ => {
            names.sort();
            Err(StoreError::AmbiguousTable {
                names: names.join(", "),
            })
        }
    }
}
