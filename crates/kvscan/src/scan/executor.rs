//! Scan executor.
//!
//! Owns the stream lifecycle for one scan: open a range cursor per the
//! spec, pull records one at a time, apply the filter set, forward
//! survivors to the report sink, and close the store exactly once no
//! matter how the stream ends. The spec's state machine (Opening →
//! Streaming → Draining | Aborting → Closed) is encoded structurally:
//! `run` consumes the executor, `close` consumes the store handle, and
//! every exit path of the pull loop funnels through the same close call.
//!
//! Back-pressure is inherent: the store cursor is an iterator, so nothing
//! is pulled until the sink has finished the previous record.

use crate::scan::error::ScanError;
use crate::scan::filter::{FilterSet, FilterTarget};
use crate::scan::report::ReportSink;
use crate::scan::spec::{Mode, ScanSpec};
use crate::scan::types::{Record, ScanStats};
use kvscan_store::{RawEntry, Store};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How often count-mode progress is emitted.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(1000);

/// A scan that died mid-stream, with the counters accumulated so far.
#[derive(Debug)]
pub struct StreamFailure {
    pub error: ScanError,
    pub stats: ScanStats,
}

/// How one scan ended.
///
/// The close result is kept separate from the scan result so a close
/// failure can never mask an earlier stream error, and a successful scan
/// is not turned into a failure by a close problem alone.
#[derive(Debug)]
pub struct ScanOutcome {
    pub result: Result<ScanStats, StreamFailure>,
    pub close_result: kvscan_store::Result<()>,
}

/// Executes one range scan against one exclusively-owned store handle.
pub struct ScanExecutor {
    store: Box<dyn Store>,
    spec: ScanSpec,
    filters: FilterSet,
    cancel: Option<Arc<AtomicBool>>,
    progress_interval: Duration,
}

impl ScanExecutor {
    pub fn new(store: Box<dyn Store>, spec: ScanSpec, filters: FilterSet) -> Self {
        Self {
            store,
            spec,
            filters,
            cancel: None,
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    /// Stop pulling promptly once `flag` is set; the close path still
    /// runs.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Override the progress window (tests use a zero interval).
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Run the scan to completion, error, or cancellation.
    ///
    /// The store is closed exactly once on every path.
    pub fn run(self, sink: &mut dyn ReportSink) -> ScanOutcome {
        let Self {
            store,
            spec,
            filters,
            cancel,
            progress_interval,
        } = self;

        let result = stream_records(
            store.as_ref(),
            &spec,
            &filters,
            cancel.as_deref(),
            progress_interval,
            sink,
        );
        let close_result = store.close();

        ScanOutcome { result, close_result }
    }
}

fn stream_records(
    store: &dyn Store,
    spec: &ScanSpec,
    filters: &FilterSet,
    cancel: Option<&AtomicBool>,
    progress_interval: Duration,
    sink: &mut dyn ReportSink,
) -> Result<ScanStats, StreamFailure> {
    let mut stats = ScanStats::start();

    let scan = match store.range_scan(&spec.to_request()) {
        Ok(scan) => scan,
        Err(error) => {
            return Err(StreamFailure {
                error: error.into(),
                stats,
            });
        }
    };

    for item in scan {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            debug!("close requested, stopping scan");
            stats.cancelled = true;
            break;
        }

        let raw = match item {
            Ok(raw) => raw,
            Err(error) => {
                return Err(StreamFailure {
                    error: error.into(),
                    stats,
                });
            }
        };
        stats.record_seen();

        let record = match decode_entry(raw, spec) {
            Ok(record) => record,
            Err(error) => return Err(StreamFailure { error, stats }),
        };

        if filters.matches(&record) {
            stats.record_emitted();
            if spec.mode == Mode::Stream {
                sink.on_record(strip_excluded(record, spec));
            }
        } else {
            stats.record_filtered();
        }

        if spec.mode == Mode::Count && stats.window_elapsed() >= progress_interval {
            sink.on_progress(&stats.progress());
            stats.reset_window();
        }
    }

    sink.on_end(&stats);
    Ok(stats)
}

/// Decode a raw entry's fetched fields per the spec's encodings.
fn decode_entry(raw: RawEntry, spec: &ScanSpec) -> Result<Record, ScanError> {
    let key = raw
        .key
        .map(|bytes| {
            spec.key_encoding
                .render(&bytes)
                .map_err(|source| ScanError::Decode {
                    field: FilterTarget::Key,
                    encoding: spec.key_encoding,
                    source,
                })
        })
        .transpose()?;
    let value = raw
        .value
        .map(|bytes| {
            spec.value_encoding
                .render(&bytes)
                .map_err(|source| ScanError::Decode {
                    field: FilterTarget::Value,
                    encoding: spec.value_encoding,
                    source,
                })
        })
        .transpose()?;

    Ok(Record { key, value })
}

/// Drop fields that were fetched for filtering but excluded from output.
fn strip_excluded(record: Record, spec: &ScanSpec) -> Record {
    Record {
        key: record.key.filter(|_| spec.include_keys),
        value: record.value.filter(|_| spec.include_values),
    }
}
