//! Scan specification and streaming-filter engine.
//!
//! One invocation runs exactly one range scan: options are validated into
//! an immutable [`ScanSpec`], filters are compiled before any store
//! access, and the [`ScanExecutor`] pulls records through the filter into
//! a [`ReportSink`], closing the store exactly once on every exit path.

pub mod encoding;
pub mod error;
pub mod executor;
pub mod filter;
pub mod report;
pub mod spec;
pub mod types;

pub use encoding::Encoding;
pub use error::ScanError;
pub use executor::{ScanExecutor, ScanOutcome, StreamFailure};
pub use filter::{FilterSet, FilterTarget};
pub use report::{CountReporter, RecordFormat, ReportSink, StreamReporter};
pub use spec::{Limit, Mode, ScanOptions, ScanSpec, DEFAULT_LIMIT};
pub use types::{ProgressSnapshot, Record, ScanStats};
