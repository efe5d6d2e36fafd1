//! Record and count reporting.
//!
//! Two mutually exclusive consumers for the executor's output: a stream
//! reporter that renders each surviving record, and a count reporter that
//! accumulates silently and speaks only in progress lines and a final
//! total. Records go to stdout so output stays pipeable; progress goes to
//! stderr.

use crate::scan::types::{ProgressSnapshot, Record, ScanStats};
use std::time::Duration;
use tracing::{error, info};

/// Consumer side of one scan.
pub trait ReportSink {
    /// A surviving record, fields already stripped to the output
    /// inclusion rules. Stream mode only.
    fn on_record(&mut self, record: Record);

    /// A periodic progress observation. Count mode only.
    fn on_progress(&mut self, progress: &ProgressSnapshot);

    /// Normal end of stream (including cancellation), with final
    /// counters. Not called when the stream aborts on an error.
    fn on_end(&mut self, stats: &ScanStats);
}

/// How stream mode renders a record, driven by the inclusion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// JSON object holding only the fields actually present.
    Json,
    KeyOnly,
    ValueOnly,
    /// `key -> value` paired text.
    Paired,
}

impl RecordFormat {
    /// Pick the format for the given output flags.
    pub fn select(json: bool, include_keys: bool, include_values: bool) -> Self {
        if json {
            RecordFormat::Json
        } else if include_keys && include_values {
            RecordFormat::Paired
        } else if include_keys {
            RecordFormat::KeyOnly
        } else {
            RecordFormat::ValueOnly
        }
    }

    /// Render one record, or nothing if the record carries no
    /// printable field for this format.
    pub fn render(&self, record: &Record) -> Option<String> {
        match self {
            RecordFormat::Json => match serde_json::to_string(record) {
                Ok(line) => Some(line),
                Err(err) => {
                    error!(error = %err, "failed to encode record as JSON");
                    None
                }
            },
            RecordFormat::KeyOnly => record.key.clone(),
            RecordFormat::ValueOnly => record.value.clone(),
            RecordFormat::Paired => Some(format!(
                "{} -> {}",
                record.key.as_deref().unwrap_or(""),
                record.value.as_deref().unwrap_or("")
            )),
        }
    }
}

/// Renders each surviving record to stdout.
pub struct StreamReporter {
    format: RecordFormat,
}

impl StreamReporter {
    pub fn new(format: RecordFormat) -> Self {
        Self { format }
    }
}

impl ReportSink for StreamReporter {
    fn on_record(&mut self, record: Record) {
        if let Some(line) = self.format.render(&record) {
            println!("{line}");
        }
    }

    fn on_progress(&mut self, _progress: &ProgressSnapshot) {}

    fn on_end(&mut self, stats: &ScanStats) {
        info!(
            records = stats.total_emitted,
            filtered = stats.total_filtered,
            elapsed = %format_elapsed(stats.elapsed()),
            "read stream finished"
        );
    }
}

/// Accumulates a count, with periodic progress lines on stderr.
pub struct CountReporter {
    /// Whether this scan covers the whole store (derived once from the
    /// spec, never from runtime counts).
    full_coverage: bool,
    quiet: bool,
}

impl CountReporter {
    pub fn new(full_coverage: bool, quiet: bool) -> Self {
        Self {
            full_coverage,
            quiet,
        }
    }
}

impl ReportSink for CountReporter {
    fn on_record(&mut self, _record: Record) {}

    fn on_progress(&mut self, progress: &ProgressSnapshot) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} records in the last {} ({} records in {})",
            progress.window_emitted,
            format_elapsed(progress.window_elapsed),
            progress.total_emitted,
            format_elapsed(progress.total_elapsed)
        );
    }

    fn on_end(&mut self, stats: &ScanStats) {
        if stats.cancelled {
            println!(
                "Counted {} records in {} before cancellation; count is partial.",
                stats.total_emitted,
                format_elapsed(stats.elapsed())
            );
            return;
        }
        let caveat = if self.full_coverage {
            "All records counted."
        } else {
            "Limited count; may not include all records."
        };
        println!(
            "Counted {} records in {}. {}",
            stats.total_emitted,
            format_elapsed(stats.elapsed()),
            caveat
        );
    }
}

/// Format an elapsed duration compactly.
///
/// Examples: `850ms`, `2.4s`, `3m 07s`.
pub fn format_elapsed(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
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
    fn test_format_selection_follows_inclusion_flags() {
        assert_eq!(RecordFormat::select(true, true, true), RecordFormat::Json);
        assert_eq!(RecordFormat::select(false, true, true), RecordFormat::Paired);
        assert_eq!(RecordFormat::select(false, true, false), RecordFormat::KeyOnly);
        assert_eq!(RecordFormat::select(false, false, true), RecordFormat::ValueOnly);
    }

    #[test]
    fn test_json_round_trip_has_exactly_the_present_fields() {
        let line = RecordFormat::Json
            .render(&record(Some("k1"), None))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        let object = parsed.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object.get("key").unwrap(), "k1");

        let line = RecordFormat::Json
            .render(&record(Some("k"), Some("v")))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, serde_json::json!({ "key": "k", "value": "v" }));
    }

    #[test]
    fn test_key_only_skips_records_without_keys() {
        assert_eq!(
            RecordFormat::KeyOnly.render(&record(Some("k"), Some("v"))),
            Some("k".to_string())
        );
        assert_eq!(RecordFormat::KeyOnly.render(&record(None, Some("v"))), None);
    }

    #[test]
    fn test_paired_rendering() {
        assert_eq!(
            RecordFormat::Paired.render(&record(Some("k"), Some("v"))),
            Some("k -> v".to_string())
        );
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(850)), "850ms");
        assert_eq!(format_elapsed(Duration::from_millis(2400)), "2.4s");
        assert_eq!(format_elapsed(Duration::from_secs(187)), "3m 07s");
    }
}
