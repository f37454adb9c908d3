use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following the QRY-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Registry resolution errors (unknown capability names)
/// - **2000-2999**: Format errors (unrecognized source formats)
/// - **3000-3999**: Source errors (I/O, connection, query execution)
/// - **4000-4999**: Optional-dependency errors
/// - **5000-5999**: Declarative query parse errors
/// - **6000-6999**: Transform errors
///
/// Codes are stable across versions (semver contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Registry Errors (1000-1999) ===
    /// QRY-1001: Connector name not registered
    UnknownConnector = 1001,
    /// QRY-1002: Transform name not registered
    UnknownTransform = 1002,

    // === Format Errors (2000-2999) ===
    /// QRY-2001: Source format could not be determined from configuration
    UnsupportedFormat = 2001,

    // === Source Errors (3000-3999) ===
    /// QRY-3001: I/O failure reading a source
    SourceIo = 3001,
    /// QRY-3002: Connection to an external source failed
    SourceConnection = 3002,
    /// QRY-3003: Query execution against an external source failed
    SourceQuery = 3003,
    /// QRY-3004: Connector configuration is structurally invalid
    InvalidSourceConfig = 3004,
    /// QRY-3005: Required client library/driver not compiled in
    DriverUnavailable = 3005,

    // === Dependency Errors (4000-4999) ===
    /// QRY-4001: Optional capability not available at runtime
    MissingOptionalDependency = 4001,

    // === Parse Errors (5000-5999) ===
    /// QRY-5001: Declarative query is structurally invalid (reserved; the
    /// current grammar degrades to partial specs instead of raising)
    MalformedQuery = 5001,

    // === Transform Errors (6000-6999) ===
    /// QRY-6001: Column value could not be coerced to a number
    TypeCoercion = 6001,
    /// QRY-6002: Transform parameters are structurally invalid
    InvalidParams = 6002,
}

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Formatted code string (e.g., "QRY-1001")
    pub fn as_str(&self) -> String {
        format!("QRY-{:04}", self.as_u16())
    }

    /// The error taxonomy kind this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self.as_u16() {
            1000..=1999 => ErrorKind::UnknownName,
            2000..=2999 => ErrorKind::UnsupportedFormat,
            3000..=3999 => ErrorKind::Source,
            4000..=4999 => ErrorKind::MissingOptionalDependency,
            5000..=5999 => ErrorKind::MalformedQuery,
            _ => ErrorKind::Transform,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("QRY-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::UnknownConnector),
            1002 => Ok(Self::UnknownTransform),
            2001 => Ok(Self::UnsupportedFormat),
            3001 => Ok(Self::SourceIo),
            3002 => Ok(Self::SourceConnection),
            3003 => Ok(Self::SourceQuery),
            3004 => Ok(Self::InvalidSourceConfig),
            3005 => Ok(Self::DriverUnavailable),
            4001 => Ok(Self::MissingOptionalDependency),
            5001 => Ok(Self::MalformedQuery),
            6001 => Ok(Self::TypeCoercion),
            6002 => Ok(Self::InvalidParams),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level taxonomy kind, used by service layers for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorKind {
    UnknownName,
    UnsupportedFormat,
    Source,
    MissingOptionalDependency,
    MalformedQuery,
    Transform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_formatting() {
        assert_eq!(ErrorCode::UnknownConnector.as_str(), "QRY-1001");
        assert_eq!(ErrorCode::UnsupportedFormat.as_str(), "QRY-2001");
        assert_eq!(ErrorCode::TypeCoercion.as_str(), "QRY-6001");
    }

    #[test]
    fn test_error_code_parsing() {
        assert_eq!(
            ErrorCode::try_from("QRY-1001".to_string()).unwrap(),
            ErrorCode::UnknownConnector
        );
        assert_eq!(
            ErrorCode::try_from("QRY-4001".to_string()).unwrap(),
            ErrorCode::MissingOptionalDependency
        );
    }

    #[test]
    fn test_error_code_parsing_errors() {
        assert!(ErrorCode::try_from("INVALID".to_string()).is_err());
        assert!(ErrorCode::try_from("QRY-0000".to_string()).is_err());
        assert!(ErrorCode::try_from("QRY-ABC".to_string()).is_err());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ErrorCode::UnknownConnector.kind(), ErrorKind::UnknownName);
        assert_eq!(ErrorCode::UnknownTransform.kind(), ErrorKind::UnknownName);
        assert_eq!(
            ErrorCode::UnsupportedFormat.kind(),
            ErrorKind::UnsupportedFormat
        );
        assert_eq!(ErrorCode::SourceConnection.kind(), ErrorKind::Source);
        assert_eq!(ErrorCode::DriverUnavailable.kind(), ErrorKind::Source);
        assert_eq!(
            ErrorCode::MissingOptionalDependency.kind(),
            ErrorKind::MissingOptionalDependency
        );
        assert_eq!(ErrorCode::MalformedQuery.kind(), ErrorKind::MalformedQuery);
        assert_eq!(ErrorCode::InvalidParams.kind(), ErrorKind::Transform);
    }
}
