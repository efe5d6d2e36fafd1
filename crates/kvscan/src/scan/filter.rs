//! Record filtering.
//!
//! Filters are regular expressions matched against the textual form of a
//! record's key and/or value. They compile once, before any store access,
//! and are applied read-only per record after the store's own range/limit
//! cursor has run.

use crate::scan::error::ScanError;
use crate::scan::types::Record;
use regex::Regex;
use std::fmt;

/// Which record field a filter (or decode step) targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    Key,
    Value,
}

impl fmt::Display for FilterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterTarget::Key => write!(f, "key"),
            FilterTarget::Value => write!(f, "value"),
        }
    }
}

/// Compiled key/value matchers for one scan.
#[derive(Debug, Default)]
pub struct FilterSet {
    key: Option<Regex>,
    value: Option<Regex>,
}

impl FilterSet {
    /// Compile the requested filter expressions.
    ///
    /// Fails fast on the first malformed pattern, naming which expression
    /// failed, so no store I/O happens with a bad filter in hand.
    pub fn compile(
        key_pattern: Option<&str>,
        value_pattern: Option<&str>,
    ) -> Result<Self, ScanError> {
        Ok(Self {
            key: key_pattern
                .map(|p| compile_one(FilterTarget::Key, p))
                .transpose()?,
            value: value_pattern
                .map(|p| compile_one(FilterTarget::Value, p))
                .transpose()?,
        })
    }

    /// True when no filter is active.
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }

    /// True when a filter targets record keys.
    pub fn matches_keys(&self) -> bool {
        self.key.is_some()
    }

    /// True when a filter targets record values.
    pub fn matches_values(&self) -> bool {
        self.value.is_some()
    }

    /// Apply every active matcher whose target field is present.
    ///
    /// The executor fetches any field a filter targets, so an absent
    /// field only arises on defensive paths and is vacuously true.
    pub fn matches(&self, record: &Record) -> bool {
        let key_ok = match (&self.key, &record.key) {
            (Some(regex), Some(key)) => regex.is_match(key),
            _ => true,
        };
        let value_ok = match (&self.value, &record.value) {
            (Some(regex), Some(value)) => regex.is_match(value),
            _ => true,
        };
        key_ok && value_ok
    }
}

fn compile_one(target: FilterTarget, pattern: &str) -> Result<Regex, ScanError> {
    Regex::new(pattern).map_err(|source| ScanError::InvalidFilter {
        target,
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: Option<&str>, value: Option<&str>) -> Record {
        Record {
            key: key.map(String::from),
            value: value.map(String::from),
        }
    }

    #[test]
    fn test_empty_set_matches_everything() {
        let filters = FilterSet::compile(None, None).unwrap();
        assert!(filters.is_empty());
        assert!(filters.matches(&record(Some("any"), Some("thing"))));
        assert!(filters.matches(&record(None, None)));
    }

    #[test]
    fn test_key_filter() {
        let filters = FilterSet::compile(Some("^user:"), None).unwrap();
        assert!(filters.matches_keys());
        assert!(!filters.matches_values());
        assert!(filters.matches(&record(Some("user:42"), None)));
        assert!(!filters.matches(&record(Some("order:42"), None)));
    }

    #[test]
    fn test_both_filters_must_match() {
        let filters = FilterSet::compile(Some("^a"), Some("1$")).unwrap();
        assert!(filters.matches(&record(Some("abc"), Some("v1"))));
        assert!(!filters.matches(&record(Some("abc"), Some("v2"))));
        assert!(!filters.matches(&record(Some("xbc"), Some("v1"))));
    }

    #[test]
    fn test_absent_field_is_vacuously_true() {
        let filters = FilterSet::compile(None, Some("needle")).unwrap();
        assert!(filters.matches(&record(Some("k"), None)));
    }

    #[test]
    fn test_invalid_pattern_names_the_expression() {
        let err = FilterSet::compile(Some("["), None).unwrap_err();
        match err {
            ScanError::InvalidFilter { target, pattern, .. } => {
                assert_eq!(target, FilterTarget::Key);
                assert_eq!(pattern, "[");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = FilterSet::compile(None, Some("(unclosed")).unwrap_err();
        assert!(matches!(
            err,
            ScanError::InvalidFilter {
                target: FilterTarget::Value,
                ..
            }
        ));
    }
}
