//! In-memory ordered store.
//!
//! Test fixture implementing the full `Store` contract over a `BTreeMap`,
//! with optional fault injection: a storage error after a fixed number of
//! entries, or a failing close. Close calls are observable through a
//! shared flag so tests can assert the exactly-once guarantee.

use crate::error::{Result, StoreError};
use crate::types::{Direction, RawEntry, ScanRequest};
use crate::{EntryScan, Store};
use std::collections::BTreeMap;
use std::io;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// BTreeMap-backed store for tests.
#[derive(Default)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    fail_after: Option<u64>,
    close_error: Option<String>,
    close_calls: Arc<AtomicUsize>,
}

impl MemStore {
    /// Store holding the given entries.
    pub fn new(entries: impl IntoIterator<Item = (Vec<u8>, Vec<u8>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Inject a storage error after `count` entries have been yielded.
    pub fn fail_after(mut self, count: u64) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Make `close` fail with the given message.
    pub fn fail_close(mut self, message: impl Into<String>) -> Self {
        self.close_error = Some(message.into());
        self
    }

    /// Shared counter of `close` invocations.
    pub fn close_calls(&self) -> Arc<AtomicUsize> {
        self.close_calls.clone()
    }
}

impl Store for MemStore {
    fn range_scan(&self, request: &ScanRequest) -> Result<EntryScan<'_>> {
        if request.is_empty_range() {
            return Ok(Box::new(std::iter::empty()));
        }

        let lower: Bound<Vec<u8>> = match &request.lower {
            Some(bound) if bound.inclusive => Bound::Included(bound.key.clone()),
            Some(bound) => Bound::Excluded(bound.key.clone()),
            None => Bound::Unbounded,
        };
        let upper: Bound<Vec<u8>> = match &request.upper {
            Some(bound) if bound.inclusive => Bound::Included(bound.key.clone()),
            Some(bound) => Bound::Excluded(bound.key.clone()),
            None => Bound::Unbounded,
        };

        let range = self.entries.range((lower, upper));
        let ordered: Vec<(&Vec<u8>, &Vec<u8>)> = match request.direction {
            Direction::Ascending => range.collect(),
            Direction::Descending => range.rev().collect(),
        };

        let limit = request.limit.unwrap_or(u64::MAX);
        let fail_after = self.fail_after;
        let entries: Vec<Result<RawEntry>> = ordered
            .into_iter()
            .take(limit as usize)
            .enumerate()
            .map(|(index, (key, value))| {
                if fail_after.is_some_and(|n| index as u64 >= n) {
                    return Err(StoreError::Io(io::Error::new(
                        io::ErrorKind::Other,
                        "injected storage failure",
                    )));
                }
                Ok(RawEntry {
                    key: request.fetch_keys.then(|| key.clone()),
                    value: request.fetch_values.then(|| value.clone()),
                })
            })
            .collect();

        Ok(Box::new(entries.into_iter()))
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        match self.close_error {
            Some(message) => Err(StoreError::Close(message)),
            None => Ok(()),
        }
    }
}
