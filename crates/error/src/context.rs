//! # Error Contexts
//!
//! Structured metadata for errors to enable programmatic handling by the
//! service layers (HTTP, CLI).

use serde::{Deserialize, Serialize};

/// Structured context attached to a [`crate::QuarryError`].
///
/// Each variant provides the fields relevant to that error type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    /// Context for QRY-1001/1002 (unknown capability name)
    UnknownName {
        requested: String,
        available: Vec<String>,
    },

    /// Context for QRY-2001 (UnsupportedFormat)
    UnsupportedFormat {
        path: String,
        extension: Option<String>,
        supported: Vec<String>,
    },

    /// Context for source errors (QRY-3001..3005)
    Source {
        connector: String,
        target: Option<String>,
    },

    /// Context for transform errors (QRY-6001/6002)
    Transform {
        transform: String,
        column: Option<String>,
    },

    /// Generic key-value context for extensibility
    Generic {
        #[serde(flatten)]
        data: std::collections::HashMap<String, serde_json::Value>,
    },
}
