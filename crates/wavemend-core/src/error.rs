//! Error types for reading, resolving and restoring.

use thiserror::Error;

use crate::container::ContainerKind;

/// Errors raised by [`ChunkReader`](crate::reader::ChunkReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The requested span exceeds the buffer.
    #[error("cannot read {len} bytes at offset {offset}: buffer holds only {available} bytes")]
    OutOfBounds {
        /// Absolute offset of the attempted read.
        offset: usize,
        /// Number of bytes requested.
        len: usize,
        /// Total buffer length.
        available: usize,
    },
}

/// Fatal, file-local errors of the restore path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// The resolved payload range is empty, inverted or outside the file.
    #[error(
        "invalid offsets producing empty or inverted payload range (start: {start}, end: {end}, file size: {file_size})"
    )]
    InvalidRange {
        /// Resolved start, before clamping.
        start: i64,
        /// Resolved end, before clamping.
        end: i64,
        /// Length of the source buffer.
        file_size: u64,
    },

    /// The audio parameters cannot describe PCM data.
    #[error("invalid audio format: {message}")]
    InvalidFormat {
        /// What is wrong with the parameters.
        message: String,
    },

    /// The payload does not fit the 32-bit size fields of the container.
    #[error("payload of {len} bytes is too large for a {kind} header")]
    PayloadTooLarge {
        /// Payload length in bytes.
        len: u64,
        /// Target container.
        kind: ContainerKind,
    },
}

/// Configuration errors raised at the boundary, before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Application name not in the profile table.
    #[error("unknown application '{0}', expected one of: logic, live, djvu")]
    UnknownApplication(String),

    /// Container name not recognized.
    #[error("unknown container format '{0}', expected 'wave' or 'aiff'")]
    UnknownContainer(String),

    /// Profile table could not be deserialized.
    #[error("invalid profile table: {0}")]
    InvalidProfiles(#[from] serde_json::Error),
}
