//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Store path does not exist
    pub fn store_not_found(path: &Path) -> Self {
        Self::new(format!("Store not found: {}", path.display()))
            .with_context("The specified store path does not exist on the filesystem")
            .with_suggestions([
                format!("TRY: Check that the path exists: ls -la {}", path.display()),
                "TRY: Verify you have read permissions for this path".to_string(),
                "TRY: Check for typos in the path".to_string(),
            ])
    }

    /// Store exists but could not be opened
    pub fn open_failed(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot open store: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                "TRY: Verify this is a redb database file".to_string(),
                "TRY: Ensure the store is not locked by a writer".to_string(),
                "TRY: Check if the file was fully written (not truncated)".to_string(),
            ])
    }

    /// Store has several tables and none was selected
    pub fn ambiguous_table(names: &str) -> Self {
        Self::new("Store contains more than one table")
            .with_context(format!("Available tables: {}", names))
            .with_suggestions(["TRY: Select one with --table <NAME>".to_string()])
    }

    /// Store has no tables at all
    pub fn no_tables(path: &Path) -> Self {
        Self::new(format!("Store contains no tables: {}", path.display()))
            .with_context("There is nothing to scan in an empty store")
            .with_suggestions([
                "TRY: Verify this is the store you meant to inspect".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Structured error output for `--json` invocations.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = serde_json::json!({
        "error": format!("{:#}", err),
    });
    eprintln!("{}", payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While scanning")
            .with_suggestions(["Try again"]);

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While scanning"));
        assert!(display.contains("Try again"));
    }

    #[test]
    fn test_store_not_found() {
        let path = PathBuf::from("/nonexistent/store");
        let err = HelpfulError::store_not_found(&path);

        let display = format!("{}", err);
        assert!(display.contains("/nonexistent/store"));
        assert!(display.contains("TRY:"));
    }

    #[test]
    fn test_ambiguous_table() {
        let err = HelpfulError::ambiguous_table("alpha, beta");

        let display = format!("{}", err);
        assert!(display.contains("alpha, beta"));
        assert!(display.contains("--table"));
    }
}
