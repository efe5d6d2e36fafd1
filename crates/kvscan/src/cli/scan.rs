//! Scan and count commands.
//!
//! Both commands run the same pipeline over one store: compile filters,
//! build the scan specification, open the store, execute, report. The
//! order matters and is load-bearing: every option-level failure
//! (bad filter expression, bad bounds, bad limit) surfaces before the
//! store is ever opened.

use crate::cli::error::HelpfulError;
use anyhow::Context;
use kvscan::scan::{
    CountReporter, Encoding, FilterSet, Mode, RecordFormat, ScanExecutor, ScanOptions,
    ScanOutcome, ScanSpec, StreamReporter,
};
use kvscan_store::{RedbStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info};

/// Range, filter, and encoding options shared by `scan` and `count`.
#[derive(Debug, clap::Args)]
pub struct RangeOpts {
    /// Table to scan (defaults to the store's only table)
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Exclusive lower bound for the scan
    #[arg(long, value_name = "KEY")]
    pub gt: Option<String>,

    /// Inclusive lower bound for the scan
    #[arg(long, value_name = "KEY")]
    pub gte: Option<String>,

    /// Exclusive upper bound for the scan
    #[arg(long, value_name = "KEY")]
    pub lt: Option<String>,

    /// Inclusive upper bound for the scan
    #[arg(long, value_name = "KEY")]
    pub lte: Option<String>,

    /// Maximum number of records to pull from the store
    #[arg(short = 'l', long)]
    pub limit: Option<u64>,

    /// Scan every record in the range (no limit)
    #[arg(short = 'L', long)]
    pub unlimited: bool,

    /// Scan in descending instead of ascending key order
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Keep only records whose key matches this regular expression
    #[arg(long, value_name = "REGEX")]
    pub key_filter: Option<String>,

    /// Keep only records whose value matches this regular expression
    #[arg(long, value_name = "REGEX")]
    pub value_filter: Option<String>,

    /// Encoding for keys (also used to parse bound values)
    #[arg(short = 'e', long, value_enum, default_value_t = Encoding::Utf8)]
    pub key_encoding: Encoding,

    /// Encoding for values
    #[arg(short = 'E', long, value_enum, default_value_t = Encoding::Utf8)]
    pub value_encoding: Encoding,
}

impl RangeOpts {
    fn to_options(&self, exclude_keys: bool, exclude_values: bool) -> ScanOptions {
        ScanOptions {
            gt: self.gt.clone(),
            gte: self.gte.clone(),
            lt: self.lt.clone(),
            lte: self.lte.clone(),
            limit: self.limit,
            unlimited: self.unlimited,
            reverse: self.reverse,
            exclude_keys,
            exclude_values,
            key_encoding: self.key_encoding,
            value_encoding: self.value_encoding,
        }
    }
}

/// Arguments for the scan command
#[derive(Debug)]
pub struct ScanArgs {
    pub path: PathBuf,
    pub range: RangeOpts,
    pub json: bool,
    pub exclude_keys: bool,
    pub exclude_values: bool,
}

/// Arguments for the count command
#[derive(Debug)]
pub struct CountArgs {
    pub path: PathBuf,
    pub range: RangeOpts,
    pub quiet: bool,
}

/// Execute the scan command
pub fn run(args: ScanArgs, cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    let filters = FilterSet::compile(
        args.range.key_filter.as_deref(),
        args.range.value_filter.as_deref(),
    )?;
    let options = args.range.to_options(args.exclude_keys, args.exclude_values);
    let spec = ScanSpec::build(Mode::Stream, &options, &filters)?;

    let store = open_store(&args.path, args.range.table.as_deref())?;
    info!(path = %args.path.display(), table = store.table(), "streaming from store");
    debug!(?spec, "scan specification");

    let format = RecordFormat::select(args.json, spec.include_keys, spec.include_values);
    let mut reporter = StreamReporter::new(format);
    let executor = ScanExecutor::new(Box::new(store), spec, filters).with_cancel_flag(cancel);
    finish(executor.run(&mut reporter))
}

/// Execute the count command
pub fn run_count(args: CountArgs, cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    let filters = FilterSet::compile(
        args.range.key_filter.as_deref(),
        args.range.value_filter.as_deref(),
    )?;
    let options = args.range.to_options(false, false);
    let spec = ScanSpec::build(Mode::Count, &options, &filters)?;

    let store = open_store(&args.path, args.range.table.as_deref())?;
    info!(path = %args.path.display(), table = store.table(), "counting records in store");
    debug!(?spec, "scan specification");

    let mut reporter = CountReporter::new(spec.full_coverage, args.quiet);
    let executor = ScanExecutor::new(Box::new(store), spec, filters).with_cancel_flag(cancel);
    finish(executor.run(&mut reporter))
}

/// Open the store, translating common operator mistakes into helpful
/// errors.
fn open_store(path: &Path, table: Option<&str>) -> anyhow::Result<RedbStore> {
    if !path.exists() {
        return Err(HelpfulError::store_not_found(path).into());
    }

    match RedbStore::open(path, table) {
        Ok(store) => Ok(store),
        Err(StoreError::AmbiguousTable { names }) => {
            Err(HelpfulError::ambiguous_table(&names).into())
        }
        Err(StoreError::NoTables { .. }) => Err(HelpfulError::no_tables(path).into()),
        Err(err @ StoreError::Open { .. }) => {
            let reason = err.to_string();
            Err(HelpfulError::open_failed(path, &reason).into())
        }
        Err(err) => Err(err).with_context(|| format!("failed to open store at {}", path.display())),
    }
}

/// Resolve a finished scan into the process outcome.
///
/// A close failure is reported on its own and never overrides the scan
/// result; partial counters are reported before a stream error exits.
fn finish(outcome: ScanOutcome) -> anyhow::Result<()> {
    if let Err(err) = outcome.close_result {
        eprintln!("Error closing the store: {err}");
    }

    match outcome.result {
        Ok(_) => Ok(()),
        Err(failure) => {
            eprintln!(
                "Scan aborted after {} records ({} emitted, {} filtered)",
                failure.stats.total_seen,
                failure.stats.total_emitted,
                failure.stats.total_filtered
            );
            Err(failure.error.into())
        }
    }
}
