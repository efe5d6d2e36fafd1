//! Data types shared by store implementations.

/// One end of a key range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBound {
    /// Boundary key, in the store's byte ordering.
    pub key: Vec<u8>,
    /// Whether the boundary key itself is part of the range.
    pub inclusive: bool,
}

impl KeyBound {
    /// Inclusive bound at `key`.
    pub fn inclusive(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            inclusive: true,
        }
    }

    /// Exclusive bound at `key`.
    pub fn exclusive(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            inclusive: false,
        }
    }
}

/// Traversal order of a range scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// A single range-scan request against a store.
///
/// The store enforces bounds, direction, and limit itself; the limit
/// applies to records pulled from the store, before any downstream
/// filtering. `fetch_keys`/`fetch_values` control which fields each raw
/// entry carries.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub lower: Option<KeyBound>,
    pub upper: Option<KeyBound>,
    pub direction: Direction,
    /// Maximum number of records to pull; `None` scans to the end of the
    /// range.
    pub limit: Option<u64>,
    pub fetch_keys: bool,
    pub fetch_values: bool,
}

impl ScanRequest {
    /// True when the requested range is empty by construction: the lower
    /// bound lies above the upper bound, or they name the same key and
    /// either side excludes it.
    pub fn is_empty_range(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lo), Some(hi)) => {
                lo.key > hi.key || (lo.key == hi.key && !(lo.inclusive && hi.inclusive))
            }
            _ => false,
        }
    }
}

/// One raw entry pulled from a store, fields present per the request's
/// fetch flags. Ephemeral: forwarded once, never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(lower: Option<KeyBound>, upper: Option<KeyBound>) -> ScanRequest {
        ScanRequest {
            lower,
            upper,
            ..ScanRequest::default()
        }
    }

    #[test]
    fn test_open_ranges_are_never_empty() {
        assert!(!request(None, None).is_empty_range());
        assert!(!request(Some(KeyBound::inclusive(*b"m")), None).is_empty_range());
        assert!(!request(None, Some(KeyBound::exclusive(*b"m"))).is_empty_range());
    }

    #[test]
    fn test_inverted_bounds_are_empty() {
        let req = request(
            Some(KeyBound::inclusive(*b"z")),
            Some(KeyBound::inclusive(*b"a")),
        );
        assert!(req.is_empty_range());
    }

    #[test]
    fn test_equal_bounds_empty_only_when_exclusive() {
        let closed = request(
            Some(KeyBound::inclusive(*b"m")),
            Some(KeyBound::inclusive(*b"m")),
        );
        assert!(!closed.is_empty_range());

        let half_open = request(
            Some(KeyBound::inclusive(*b"m")),
            Some(KeyBound::exclusive(*b"m")),
        );
        assert!(half_open.is_empty_range());
    }
}
