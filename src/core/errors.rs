//! Shared error types for the application

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Why a single unit could not be analyzed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The text is not valid Python
    Syntax,
    /// The loader could not read the unit
    Read,
    /// A metric broke one of its own invariants
    Internal,
}

/// Per-unit failure record. Never fatal to a batch.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq)]
#[error("{unit}:{line}:{column}: {message}")]
pub struct ParseFailure {
    pub unit: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub kind: FailureKind,
}

impl ParseFailure {
    pub fn syntax(
        unit: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            unit: unit.into(),
            line,
            column,
            message: message.into(),
            kind: FailureKind::Syntax,
        }
    }

    pub fn read(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            line: 0,
            column: 0,
            message: message.into(),
            kind: FailureKind::Read,
        }
    }

    pub fn internal(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            line: 0,
            column: 0,
            message: message.into(),
            kind: FailureKind::Internal,
        }
    }
}

/// Main error type for pyqual operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid source text
    #[error("Parse error in {0}")]
    Parse(#[from] ParseFailure),

    /// Invalid thresholds or weights supplied by the caller
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A computed metric left its legal range
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Per-unit errors are reported and skipped; everything else stops the call.
    pub fn is_unit_local(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::InvariantViolation(_))
    }

    /// Convert a unit-local error into the failure record shown to the user.
    pub fn into_failure(self, unit: &str) -> ParseFailure {
        match self {
            Self::Parse(failure) => failure,
            Self::InvariantViolation(message) => {
                ParseFailure::internal(unit, format!("internal invariant violated: {message}"))
            }
            other => ParseFailure::internal(unit, other.to_string()),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_display_has_location() {
        let failure = ParseFailure::syntax("pkg/mod.py", 3, 7, "missing `)`");
        assert_eq!(failure.to_string(), "pkg/mod.py:3:7: missing `)`");
        assert_eq!(failure.kind, FailureKind::Syntax);
    }

    #[test]
    fn test_invariant_becomes_internal_failure() {
        let failure = Error::invariant("style compliance 120").into_failure("a.py");
        assert_eq!(failure.kind, FailureKind::Internal);
        assert_eq!(failure.unit, "a.py");
        assert!(failure.message.contains("style compliance 120"));
    }

    #[test]
    fn test_configuration_is_not_unit_local() {
        assert!(!Error::configuration("bad weights").is_unit_local());
        assert!(Error::from(ParseFailure::read("x.py", "denied")).is_unit_local());
    }
}
