//! Core data types for one scan's lifetime.

use serde::Serialize;
use std::time::{Duration, Instant};

/// One decoded record, fields present per the scan's inclusion rules.
///
/// Ephemeral: built per streamed entry, forwarded once, not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Counters owned by the executor for the duration of one scan.
///
/// `total_seen == total_emitted + total_filtered` holds at every point of
/// the stream, not just at the end.
#[derive(Debug, Clone)]
pub struct ScanStats {
    /// Records pulled from the store cursor.
    pub total_seen: u64,
    /// Records that passed every active filter.
    pub total_emitted: u64,
    /// Records dropped by a filter.
    pub total_filtered: u64,
    /// Whether the scan was stopped by an external close request.
    pub cancelled: bool,
    started: Instant,
    window_started: Instant,
    window_emitted: u64,
}

impl ScanStats {
    /// Fresh counters with both stopwatches running.
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            total_seen: 0,
            total_emitted: 0,
            total_filtered: 0,
            cancelled: false,
            started: now,
            window_started: now,
            window_emitted: 0,
        }
    }

    pub fn record_seen(&mut self) {
        self.total_seen += 1;
    }

    pub fn record_emitted(&mut self) {
        self.total_emitted += 1;
        self.window_emitted += 1;
    }

    pub fn record_filtered(&mut self) {
        self.total_filtered += 1;
    }

    /// Time since the scan started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since the last progress emission.
    pub fn window_elapsed(&self) -> Duration {
        self.window_started.elapsed()
    }

    /// Snapshot for one progress emission.
    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            window_emitted: self.window_emitted,
            window_elapsed: self.window_elapsed(),
            total_seen: self.total_seen,
            total_emitted: self.total_emitted,
            total_filtered: self.total_filtered,
            total_elapsed: self.elapsed(),
        }
    }

    /// Start a new progress window.
    pub fn reset_window(&mut self) {
        self.window_started = Instant::now();
        self.window_emitted = 0;
    }
}

/// Periodic progress observation during a count.
///
/// Purely observational: emitting one never changes ordering or counts.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Surviving records since the previous emission.
    pub window_emitted: u64,
    pub window_elapsed: Duration,
    pub total_seen: u64,
    pub total_emitted: u64,
    pub total_filtered: u64,
    pub total_elapsed: Duration,
}
