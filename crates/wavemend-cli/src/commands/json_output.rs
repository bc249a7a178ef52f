//! JSON output types shared by the `--json` modes of all commands.

use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
/// Header diagnostics keep their own `H0xx`/`W0xx`/`N0xx` codes.
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Unknown file extension
    pub const UNKNOWN_EXTENSION: &str = "CLI_002";
    /// Path is neither a file nor a directory
    pub const INVALID_PATH: &str = "CLI_003";
    /// Destination exists but has the wrong type
    pub const INVALID_DESTINATION: &str = "CLI_004";
    /// File could not be written
    pub const FILE_WRITE: &str = "CLI_005";
    /// Header could not be restored
    pub const RESTORE_FAILED: &str = "CLI_006";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// File the error refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file path.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_skips_missing_file() {
        let error = JsonError::new(error_codes::FILE_READ, "boom");
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"code":"CLI_001","message":"boom"}"#);

        let error = error.with_file("a.wav");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""file":"a.wav""#));
    }
}
