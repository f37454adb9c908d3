//! # quarry-error
//!
//! Unified error types for the Quarry tabular query engine.
//!
//! All errors carry:
//! - Numeric error codes (QRY-XXXX), grouped by taxonomy kind
//! - Structured context for programmatic handling
//! - Actionable hints

mod code;
mod context;
mod convert;

pub use code::{ErrorCode, ErrorKind};
pub use context::ErrorContext;
pub use convert::find_closest_match;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unified error type for all Quarry operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarryError {
    /// Numeric error code (e.g., "QRY-1001")
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Structured context for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Actionable suggestion for correction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl QuarryError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The taxonomy kind of this error (shorthand for `self.code.kind()`).
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Serialize to JSON for API responses
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize QuarryError: {}", e);
            format!(
                r#"{{"code":"{}","message":"Serialization failed"}}"#,
                self.code
            )
        })
    }
}

impl fmt::Display for QuarryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (Hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for QuarryError {}

/// Result type alias for Quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_builder() {
        let err = QuarryError::new(ErrorCode::UnknownConnector, "Unknown connector: nope")
            .with_hint("Did you mean 'local'?");

        assert_eq!(err.code, ErrorCode::UnknownConnector);
        assert_eq!(err.kind(), ErrorKind::UnknownName);
        assert_eq!(err.hint, Some("Did you mean 'local'?".to_string()));
        assert!(err.context.is_none());
    }

    #[test]
    fn test_display_implementation() {
        let err = QuarryError::new(ErrorCode::UnsupportedFormat, "Unsupported file type")
            .with_hint("Use .csv or .parquet");

        assert_eq!(
            err.to_string(),
            "[QRY-2001] Unsupported file type (Hint: Use .csv or .parquet)"
        );

        let err_no_hint = QuarryError::new(ErrorCode::SourceIo, "read failed");
        assert_eq!(err_no_hint.to_string(), "[QRY-3001] read failed");
    }

    #[test]
    fn test_json_output() {
        let err = QuarryError::new(ErrorCode::SourceConnection, "connection refused");
        let json = err.to_json();

        assert!(json.contains("\"code\":\"QRY-3002\""));
        assert!(json.contains("\"message\":\"connection refused\""));
    }
}
