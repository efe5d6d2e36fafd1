//! Error types for the scan engine.

use crate::scan::encoding::{Encoding, EncodingError};
use crate::scan::filter::FilterTarget;
use kvscan_store::StoreError;
use thiserror::Error;

/// Scan engine errors.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bad combination of bounds/limits, or an unparseable option value.
    /// Fatal before any store access.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A filter expression failed to compile. Fatal before any store
    /// access; names the offending expression.
    #[error("invalid {target} filter expression '{pattern}': {source}")]
    InvalidFilter {
        target: FilterTarget,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A fetched field failed to decode mid-scan.
    #[error("failed to decode {field} with {encoding} encoding: {source}")]
    Decode {
        field: FilterTarget,
        encoding: Encoding,
        #[source]
        source: EncodingError,
    },

    /// Store-level failure (open, read, or close).
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ScanError {
    /// Invalid-options error with a formatted message.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }
}
