//! Scan specification builder.
//!
//! Turns the loosely-typed option set coming off the command line into
//! one immutable, validated [`ScanSpec`]. All option-level failures
//! (`InvalidOptions`) surface here, before any store access.

use crate::scan::encoding::Encoding;
use crate::scan::error::ScanError;
use crate::scan::filter::FilterSet;
use kvscan_store::{Direction, KeyBound, ScanRequest};

/// Records pulled per scan when neither `--limit` nor `--unlimited` is
/// given in stream mode.
pub const DEFAULT_LIMIT: u64 = 100;

/// What the invocation does with surviving records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Render each surviving record.
    Stream,
    /// Accumulate a count with periodic progress.
    Count,
}

/// Maximum number of records pulled from the store.
///
/// The limit applies to records *seen* by the cursor, before filtering:
/// filters can only shrink the number of survivors below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Bounded(u64),
    Unlimited,
}

impl Limit {
    pub fn as_option(&self) -> Option<u64> {
        match self {
            Limit::Bounded(n) => Some(*n),
            Limit::Unlimited => None,
        }
    }
}

/// Raw option values, as parsed from the invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub gt: Option<String>,
    pub gte: Option<String>,
    pub lt: Option<String>,
    pub lte: Option<String>,
    pub limit: Option<u64>,
    pub unlimited: bool,
    pub reverse: bool,
    pub exclude_keys: bool,
    pub exclude_values: bool,
    pub key_encoding: Encoding,
    pub value_encoding: Encoding,
}

/// Canonical description of one range scan.
///
/// Built once from the merged option set, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ScanSpec {
    pub lower: Option<KeyBound>,
    pub upper: Option<KeyBound>,
    pub direction: Direction,
    pub limit: Limit,
    /// Fields present in emitted records.
    pub include_keys: bool,
    pub include_values: bool,
    /// Fields pulled from the store. A filtered field is fetched even
    /// when excluded from output; it is stripped again before emission.
    pub fetch_keys: bool,
    pub fetch_values: bool,
    pub key_encoding: Encoding,
    pub value_encoding: Encoding,
    pub mode: Mode,
    /// True when the scan covers the entire store: no bound on either
    /// side and no limit truncation. Derived once here; filters do not
    /// affect it because they run after the cursor.
    pub full_coverage: bool,
}

impl ScanSpec {
    /// Validate and normalize `options` into a spec for `mode`.
    ///
    /// Precedence rules (documented, deterministic):
    /// - an inclusive bound wins over its exclusive form (`gte` over
    ///   `gt`, `lte` over `lt`) when both are supplied;
    /// - an explicit `limit` wins over `unlimited`;
    /// - absent both, stream mode defaults to [`DEFAULT_LIMIT`] and count
    ///   mode to unlimited.
    ///
    /// Bounds are never swapped: an inverted range is left to the store,
    /// which scans it as empty.
    pub fn build(mode: Mode, options: &ScanOptions, filters: &FilterSet) -> Result<Self, ScanError> {
        let lower = build_bound(
            options.gte.as_deref(),
            options.gt.as_deref(),
            "gte",
            "gt",
            options.key_encoding,
        )?;
        let upper = build_bound(
            options.lte.as_deref(),
            options.lt.as_deref(),
            "lte",
            "lt",
            options.key_encoding,
        )?;

        let limit = match (options.limit, options.unlimited) {
            (Some(0), _) => {
                return Err(ScanError::invalid_options("limit must be a positive integer"));
            }
            (Some(n), _) => Limit::Bounded(n),
            (None, true) => Limit::Unlimited,
            (None, false) => match mode {
                Mode::Stream => Limit::Bounded(DEFAULT_LIMIT),
                Mode::Count => Limit::Unlimited,
            },
        };

        let (include_keys, include_values, fetch_keys, fetch_values) = match mode {
            Mode::Stream => {
                let include_keys = !options.exclude_keys;
                let include_values = !options.exclude_values;
                if !include_keys && !include_values {
                    return Err(ScanError::invalid_options(
                        "cannot exclude both keys and values from the stream",
                    ));
                }
                (
                    include_keys,
                    include_values,
                    include_keys || filters.matches_keys(),
                    include_values || filters.matches_values(),
                )
            }
            // A count needs keys to walk the range, and values only when
            // a value filter has to see them.
            Mode::Count => (false, false, true, filters.matches_values()),
        };

        let full_coverage = lower.is_none() && upper.is_none() && limit == Limit::Unlimited;

        Ok(Self {
            lower,
            upper,
            direction: if options.reverse {
                Direction::Descending
            } else {
                Direction::Ascending
            },
            limit,
            include_keys,
            include_values,
            fetch_keys,
            fetch_values,
            key_encoding: options.key_encoding,
            value_encoding: options.value_encoding,
            mode,
            full_coverage,
        })
    }

    /// The store-facing request for this spec.
    pub fn to_request(&self) -> ScanRequest {
        ScanRequest {
            lower: self.lower.clone(),
            upper: self.upper.clone(),
            direction: self.direction,
            limit: self.limit.as_option(),
            fetch_keys: self.fetch_keys,
            fetch_values: self.fetch_values,
        }
    }
}

fn build_bound(
    inclusive: Option<&str>,
    exclusive: Option<&str>,
    inclusive_name: &str,
    exclusive_name: &str,
    encoding: Encoding,
) -> Result<Option<KeyBound>, ScanError> {
    let (text, name, is_inclusive) = match (inclusive, exclusive) {
        (Some(text), _) => (text, inclusive_name, true),
        (None, Some(text)) => (text, exclusive_name, false),
        (None, None) => return Ok(None),
    };

    let key = encoding.parse(text).map_err(|err| {
        ScanError::InvalidOptions(format!("invalid {name} value '{text}': {err}"))
    })?;
    Ok(Some(KeyBound {
        key,
        inclusive: is_inclusive,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_filters() -> FilterSet {
        FilterSet::compile(None, None).unwrap()
    }

    fn value_filter() -> FilterSet {
        FilterSet::compile(None, Some("x")).unwrap()
    }

    #[test]
    fn test_defaults_per_mode() {
        let stream = ScanSpec::build(Mode::Stream, &ScanOptions::default(), &no_filters()).unwrap();
        assert_eq!(stream.limit, Limit::Bounded(DEFAULT_LIMIT));
        assert!(stream.include_keys && stream.include_values);
        assert!(!stream.full_coverage);

        let count = ScanSpec::build(Mode::Count, &ScanOptions::default(), &no_filters()).unwrap();
        assert_eq!(count.limit, Limit::Unlimited);
        assert!(count.fetch_keys);
        assert!(!count.fetch_values);
        assert!(count.full_coverage);
    }

    #[test]
    fn test_inclusive_bound_wins_over_exclusive() {
        let options = ScanOptions {
            gt: Some("a".to_string()),
            gte: Some("b".to_string()),
            lt: Some("y".to_string()),
            lte: Some("x".to_string()),
            ..ScanOptions::default()
        };
        let spec = ScanSpec::build(Mode::Stream, &options, &no_filters()).unwrap();
        assert_eq!(spec.lower, Some(KeyBound::inclusive(*b"b")));
        assert_eq!(spec.upper, Some(KeyBound::inclusive(*b"x")));
    }

    #[test]
    fn test_exclusive_bounds_map_alone() {
        let options = ScanOptions {
            gt: Some("a".to_string()),
            lt: Some("z".to_string()),
            ..ScanOptions::default()
        };
        let spec = ScanSpec::build(Mode::Stream, &options, &no_filters()).unwrap();
        assert_eq!(spec.lower, Some(KeyBound::exclusive(*b"a")));
        assert_eq!(spec.upper, Some(KeyBound::exclusive(*b"z")));
    }

    #[test]
    fn test_explicit_limit_wins_over_unlimited() {
        let options = ScanOptions {
            limit: Some(7),
            unlimited: true,
            ..ScanOptions::default()
        };
        let spec = ScanSpec::build(Mode::Count, &options, &no_filters()).unwrap();
        assert_eq!(spec.limit, Limit::Bounded(7));
        assert!(!spec.full_coverage);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let options = ScanOptions {
            limit: Some(0),
            ..ScanOptions::default()
        };
        let err = ScanSpec::build(Mode::Stream, &options, &no_filters()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidOptions(_)));
    }

    #[test]
    fn test_excluding_both_fields_rejected() {
        let options = ScanOptions {
            exclude_keys: true,
            exclude_values: true,
            ..ScanOptions::default()
        };
        let err = ScanSpec::build(Mode::Stream, &options, &no_filters()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidOptions(_)));
    }

    #[test]
    fn test_filter_forces_fetch_of_excluded_field() {
        let options = ScanOptions {
            exclude_values: true,
            ..ScanOptions::default()
        };
        let spec = ScanSpec::build(Mode::Stream, &options, &value_filter()).unwrap();
        assert!(!spec.include_values);
        assert!(spec.fetch_values);
    }

    #[test]
    fn test_count_fetches_values_only_for_value_filter() {
        let plain = ScanSpec::build(Mode::Count, &ScanOptions::default(), &no_filters()).unwrap();
        assert!(!plain.fetch_values);

        let filtered = ScanSpec::build(Mode::Count, &ScanOptions::default(), &value_filter()).unwrap();
        assert!(filtered.fetch_values);
        assert!(!filtered.include_values);
    }

    #[test]
    fn test_bounds_clear_full_coverage() {
        let options = ScanOptions {
            gte: Some("b".to_string()),
            unlimited: true,
            ..ScanOptions::default()
        };
        let spec = ScanSpec::build(Mode::Count, &options, &no_filters()).unwrap();
        assert!(!spec.full_coverage);
    }

    #[test]
    fn test_filters_do_not_clear_full_coverage() {
        let spec = ScanSpec::build(Mode::Count, &ScanOptions::default(), &value_filter()).unwrap();
        assert!(spec.full_coverage);
    }

    #[test]
    fn test_bound_parse_failure_is_invalid_options() {
        let options = ScanOptions {
            gte: Some("zz-not-hex".to_string()),
            key_encoding: Encoding::Hex,
            ..ScanOptions::default()
        };
        let err = ScanSpec::build(Mode::Stream, &options, &no_filters()).unwrap_err();
        match err {
            ScanError::InvalidOptions(message) => assert!(message.contains("gte")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reverse_sets_direction() {
        let options = ScanOptions {
            reverse: true,
            ..ScanOptions::default()
        };
        let spec = ScanSpec::build(Mode::Stream, &options, &no_filters()).unwrap();
        assert_eq!(spec.direction, Direction::Descending);
    }
}
