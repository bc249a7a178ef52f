//! Type definitions for the restore command.

use serde::Serialize;
use std::path::PathBuf;
use wavemend_core::{Application, ContainerKind, PcmFormat, ResolvedRange, RestoreParameters};

use super::super::json_output::JsonError;

/// Options shared by every file of one restore run.
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub format: PcmFormat,
    pub application: Application,
    /// Payload start; negative counts from the end of the file
    pub offset: Option<i64>,
    /// Payload end; negative counts from the end of the file
    pub end_offset: Option<i64>,
    /// Target container; taken from the source extension when `None`
    pub container: Option<ContainerKind>,
    /// Profile table file (JSON); built-in profiles when `None`
    pub profiles: Option<PathBuf>,
    /// Restore files in a directory even when their header has no errors
    pub force: bool,
    /// Replace existing destination files
    pub overwrite: bool,
    pub json: bool,
}

impl RestoreOptions {
    /// Core parameters for a file whose container is `kind`.
    pub fn parameters(&self, kind: ContainerKind) -> RestoreParameters {
        RestoreParameters::new(self.container.unwrap_or(kind), self.format)
            .with_source_container(kind)
            .with_application(self.application)
            .with_start_offset(self.offset)
            .with_end_offset(self.end_offset)
    }
}

/// Outcome of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreStatus {
    /// A new header was written
    Restored,
    /// Inspection found no errors; nothing was written
    Intact,
    /// The destination already exists
    Skipped,
    /// Reading, restoring or writing failed
    Failed,
}

/// Result of restoring a single file.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreFileResult {
    /// Source path
    pub source: String,
    /// Destination path
    pub destination: String,
    /// Container kind of the source, by extension
    pub source_container: ContainerKind,
    /// Container written to the destination
    pub container: ContainerKind,
    pub status: RestoreStatus,
    /// Header errors found in the source before restoring
    pub header_errors: usize,
    /// Payload range taken from the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ResolvedRange>,
    /// BLAKE3 hex digest of the payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_hash: Option<String>,
    /// Coded error (if the file failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

/// Summary of restore results.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreSummary {
    /// Audio files considered
    pub total: usize,
    pub restored: usize,
    pub intact: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// JSON output for the restore command.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutput {
    /// True if no file failed
    pub success: bool,
    pub results: Vec<RestoreFileResult>,
    pub summary: RestoreSummary,
    pub errors: Vec<JsonError>,
}

impl RestoreOutput {
    pub fn from_results(results: Vec<RestoreFileResult>, errors: Vec<JsonError>) -> Self {
        let count = |status: RestoreStatus| results.iter().filter(|r| r.status == status).count();
        let summary = RestoreSummary {
            total: results.len(),
            restored: count(RestoreStatus::Restored),
            intact: count(RestoreStatus::Intact),
            skipped: count(RestoreStatus::Skipped),
            failed: count(RestoreStatus::Failed),
        };
        let success = summary.failed == 0 && errors.is_empty();

        Self {
            success,
            results,
            summary,
            errors,
        }
    }
}
