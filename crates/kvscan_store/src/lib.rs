//! Store access layer for kvscan.
//!
//! Wraps an ordered, persistent key-value store behind a small read-only
//! contract: open a store, run one range scan honoring bounds/direction/
//! limit, close the handle. The engine above this crate never touches the
//! storage format; it consumes raw byte entries from the scan iterator.

pub mod backend;
pub mod error;
pub mod mem;
pub mod types;

pub use backend::RedbStore;
pub use error::{Result, StoreError};
pub use mem::MemStore;
pub use types::{Direction, KeyBound, RawEntry, ScanRequest};

/// A fallible stream of raw entries from one range scan.
pub type EntryScan<'a> = Box<dyn Iterator<Item = Result<RawEntry>> + 'a>;

/// Read-only contract every store backend implements.
///
/// One handle is exclusively owned by one scan's executor; `close`
/// consumes the handle so it cannot run twice.
pub trait Store {
    /// Open a cursor over the requested range, in store key order.
    ///
    /// The store itself enforces bounds, direction, and limit. Entries
    /// arrive one at a time; the iterator pulls nothing ahead of the
    /// caller.
    fn range_scan(&self, request: &ScanRequest) -> Result<EntryScan<'_>>;

    /// Release the underlying handle. Runs exactly once per store.
    fn close(self: Box<Self>) -> Result<()>;
}
