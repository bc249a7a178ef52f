//! Structured inspection results.
//!
//! The parser never fails; every anomaly it meets becomes one of the records
//! below. Records keep their values as typed fields and render the
//! human-readable wording through `Display`, so presentation layers can choose
//! between text and JSON without re-deriving anything.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::container::ContainerKind;
use crate::error::ReadError;
use crate::format::FormatInfo;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational (skipped chunks).
    Note,
    /// Non-fatal size or structural inconsistency.
    Warning,
    /// Structural error; the header cannot be trusted.
    Error,
}

/// Common interface of all diagnostic records.
pub trait Diagnostic: fmt::Display {
    /// Stable code (e.g. "H001", "W004", "N001").
    fn code(&self) -> &'static str;
    fn severity(&self) -> Severity;
}

/// Renders a 4-byte tag for messages.
pub(crate) fn tag_str(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Uppercase hex pairs separated by single spaces.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Structural errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderError {
    /// The buffer does not start with the expected magic. `expected` is `None`
    /// when no container kind was requested and neither magic matched.
    MissingMagic { expected: Option<ContainerKind> },
    /// Bytes 8-12 do not hold the form type.
    FormTypeMismatch { kind: ContainerKind },
    /// The buffer ends inside the 12-byte outer header.
    TruncatedHeader {
        kind: ContainerKind,
        source: ReadError,
    },
    /// The buffer is shorter than the canonical header.
    FileTooShort { kind: ContainerKind, file_size: u64 },
    /// A chunk identifier contains non-printable bytes.
    InvalidChunkName { offset: u64, bytes: [u8; 4] },
    /// A mandatory format field could not be read.
    UnreadableFormatChunk {
        tag: [u8; 4],
        offset: u64,
        source: ReadError,
    },
    /// A mandatory chunk was never encountered.
    MissingChunk { tag: [u8; 4] },
    InvalidChannels,
    InvalidSampleRate,
    InvalidBitsPerSample,
}

impl Diagnostic for HeaderError {
    fn code(&self) -> &'static str {
        match self {
            HeaderError::MissingMagic { .. } => "H001",
            HeaderError::FormTypeMismatch { .. } => "H002",
            HeaderError::TruncatedHeader { .. } => "H003",
            HeaderError::FileTooShort { .. } => "H004",
            HeaderError::InvalidChunkName { .. } => "H005",
            HeaderError::UnreadableFormatChunk { .. } => "H006",
            HeaderError::MissingChunk { .. } => "H007",
            HeaderError::InvalidChannels => "H008",
            HeaderError::InvalidSampleRate => "H009",
            HeaderError::InvalidBitsPerSample => "H010",
        }
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::MissingMagic { expected: None } => write!(
                f,
                "File does not start with 'RIFF' or 'FORM' and therefore does not contain a correct header."
            ),
            HeaderError::MissingMagic {
                expected: Some(kind),
            } => write!(
                f,
                "File does not start with '{}' and therefore does not contain a correct {} file header.",
                tag_str(kind.magic()),
                kind
            ),
            HeaderError::FormTypeMismatch { kind } => {
                write!(f, "Bytes 8-12 do not contain '{}'", tag_str(kind.form_type()))
            }
            HeaderError::TruncatedHeader { kind, source } => {
                write!(f, "{} header is truncated: {}", kind, source)
            }
            HeaderError::FileTooShort { kind, file_size } => write!(
                f,
                "File is only {} bytes long and therefore can not contain a complete {} file header.",
                file_size, kind
            ),
            HeaderError::InvalidChunkName { bytes, .. } => write!(
                f,
                "Invalid (non-printable) chunk name encountered (byte sequence {}). Aborting analysis.",
                hex_bytes(bytes)
            ),
            HeaderError::UnreadableFormatChunk {
                tag,
                offset,
                source,
            } => write!(
                f,
                "Could not read '{}' chunk at offset {}: {}",
                tag_str(tag),
                offset,
                source
            ),
            HeaderError::MissingChunk { tag } => write!(f, "No '{}' chunk found", tag_str(tag)),
            HeaderError::InvalidChannels => write!(f, "Number of channels is invalid."),
            HeaderError::InvalidSampleRate => write!(f, "Sample rate is invalid."),
            HeaderError::InvalidBitsPerSample => write!(f, "Bits per sample value is invalid."),
        }
    }
}

/// Consistency warnings.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderWarning {
    /// Outer chunk size disagrees with `file_size - 8`.
    ChunkSizeMismatch { expected: u64, actual: u32 },
    /// Format chunk body is smaller than the format requires.
    FormatChunkTooSmall {
        tag: [u8; 4],
        declared: u32,
        minimum: u32,
    },
    /// WAVE audio format other than integer PCM.
    UnsupportedAudioFormat { audio_format: u16 },
    BlockAlignMismatch { expected: u64, actual: u16 },
    ByteRateMismatch { expected: u64, actual: u32 },
    /// A chunk declares more bytes than the buffer holds.
    IncompleteWalk {
        tag: [u8; 4],
        offset: u64,
        declared: u32,
        remaining: u64,
    },
    /// Bytes left over that cannot hold a chunk header.
    TrailingBytes { offset: u64, len: u64 },
    /// Declared data size disagrees with the bytes following the chunk header.
    DataSizeMismatch { declared: u32, available: u64 },
    /// AIFF frame count disagrees with the SSND chunk size.
    FrameCountMismatch { frames: u32, expected: u64 },
    /// A second format or data chunk was encountered and ignored.
    DuplicateChunk { tag: [u8; 4], offset: u64 },
}

impl Diagnostic for HeaderWarning {
    fn code(&self) -> &'static str {
        match self {
            HeaderWarning::ChunkSizeMismatch { .. } => "W001",
            HeaderWarning::FormatChunkTooSmall { .. } => "W002",
            HeaderWarning::UnsupportedAudioFormat { .. } => "W003",
            HeaderWarning::BlockAlignMismatch { .. } => "W004",
            HeaderWarning::ByteRateMismatch { .. } => "W005",
            HeaderWarning::IncompleteWalk { .. } => "W006",
            HeaderWarning::TrailingBytes { .. } => "W007",
            HeaderWarning::DataSizeMismatch { .. } => "W008",
            HeaderWarning::FrameCountMismatch { .. } => "W009",
            HeaderWarning::DuplicateChunk { .. } => "W010",
        }
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }
}

impl fmt::Display for HeaderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderWarning::ChunkSizeMismatch { expected, actual } => write!(
                f,
                "Chunk size does not match file size. Should be equal to total number of bytes - 8 = {}, but was: {} (difference: {})",
                expected,
                actual,
                expected.abs_diff(*actual as u64)
            ),
            HeaderWarning::FormatChunkTooSmall {
                tag,
                declared,
                minimum,
            } => write!(
                f,
                "'{}' chunk declares {} bytes, but at least {} are required.",
                tag_str(tag),
                declared,
                minimum
            ),
            HeaderWarning::UnsupportedAudioFormat { .. } => {
                write!(f, "Audio format is not equal to 1.")
            }
            HeaderWarning::BlockAlignMismatch { expected, actual } => write!(
                f,
                "Block align should be equal to number of channels * bits per sample / 8 = {}, but is: {} (difference: {})",
                expected,
                actual,
                expected.abs_diff(*actual as u64)
            ),
            HeaderWarning::ByteRateMismatch { expected, actual } => write!(
                f,
                "Byte rate should be equal to sample rate * number of channels * bits per sample / 8 = {}, but is: {} (difference: {})",
                expected,
                actual,
                expected.abs_diff(*actual as u64)
            ),
            HeaderWarning::IncompleteWalk {
                tag,
                offset,
                declared,
                remaining,
            } => write!(
                f,
                "Chunk structure could not be fully traversed: '{}' chunk at offset {} declares {} bytes, but only {} bytes remain.",
                tag_str(tag),
                offset,
                declared,
                remaining
            ),
            HeaderWarning::TrailingBytes { offset, len } => write!(
                f,
                "Chunk structure could not be fully traversed: {} trailing bytes at offset {} are too short for a chunk header.",
                len, offset
            ),
            HeaderWarning::DataSizeMismatch {
                declared,
                available,
            } => write!(
                f,
                "Data subchunk size does not match file size. Should be {}, but is: {} (difference: {})",
                available,
                declared,
                available.abs_diff(*declared as u64)
            ),
            HeaderWarning::FrameCountMismatch { frames, expected } => write!(
                f,
                "Number of frames should be equal to (SSND chunk size - 8) / block align = {}, but is: {} (difference: {})",
                expected,
                frames,
                expected.abs_diff(*frames as u64)
            ),
            HeaderWarning::DuplicateChunk { tag, offset } => write!(
                f,
                "Duplicate '{}' chunk at offset {} ignored.",
                tag_str(tag),
                offset
            ),
        }
    }
}

/// Informational notes.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderNote {
    /// An unrecognized chunk was skipped during the walk.
    SkippedChunk { tag: [u8; 4], offset: u64, size: u32 },
    /// Bytes after the data chunk that do not start with a chunk header.
    UnparsedTail { offset: u64, len: u64 },
}

impl Diagnostic for HeaderNote {
    fn code(&self) -> &'static str {
        match self {
            HeaderNote::SkippedChunk { .. } => "N001",
            HeaderNote::UnparsedTail { .. } => "N002",
        }
    }

    fn severity(&self) -> Severity {
        Severity::Note
    }
}

impl fmt::Display for HeaderNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderNote::SkippedChunk { tag, size, .. } => {
                write!(f, "Skipping {} chunk (size: {}).", tag_str(tag), size)
            }
            HeaderNote::UnparsedTail { offset, len } => write!(
                f,
                "{} bytes at offset {} follow the data chunk without a chunk header and are treated as audio data.",
                len, offset
            ),
        }
    }
}

/// Serializes any diagnostic as `{code, severity, message}`.
struct Record<'a, D>(&'a D);

impl<D: Diagnostic> Serialize for Record<'_, D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 3)?;
        state.serialize_field("code", self.0.code())?;
        state.serialize_field("severity", &self.0.severity())?;
        state.serialize_field("message", &self.0.to_string())?;
        state.end()
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_records<S, D>(records: &Vec<D>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    D: Diagnostic,
{
    serializer.collect_seq(records.iter().map(Record))
}

/// Everything the parser could learn from one buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderReport {
    /// Length of the inspected buffer.
    pub file_size: u64,
    /// `None` only when no known magic was found.
    pub container_kind: Option<ContainerKind>,
    /// Declared size of the outer RIFF/FORM chunk.
    pub declared_chunk_size: Option<u32>,
    /// Declared size of the format chunk.
    pub format_chunk_size: Option<u32>,
    pub format_info: Option<FormatInfo>,
    /// Declared size of the data/SSND chunk.
    pub declared_data_size: Option<u32>,
    /// Absolute offset of the data/SSND chunk body.
    pub data_offset: Option<u64>,
    /// AIFF SSND offset field.
    pub sound_data_offset: Option<u32>,
    /// AIFF SSND block size field.
    pub sound_block_size: Option<u32>,
    /// Leading bytes of the buffer, up to the canonical header length.
    #[serde(serialize_with = "serialize_hex")]
    pub raw_header_bytes: Vec<u8>,
    #[serde(serialize_with = "serialize_records")]
    pub errors: Vec<HeaderError>,
    #[serde(serialize_with = "serialize_records")]
    pub warnings: Vec<HeaderWarning>,
    #[serde(serialize_with = "serialize_records")]
    pub notes: Vec<HeaderNote>,
}

#[allow(clippy::ptr_arg)]
fn serialize_hex<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex_bytes(bytes))
}

impl HeaderReport {
    pub(crate) fn new(file_size: u64, container_kind: Option<ContainerKind>) -> Self {
        Self {
            file_size,
            container_kind,
            declared_chunk_size: None,
            format_chunk_size: None,
            format_info: None,
            declared_data_size: None,
            data_offset: None,
            sound_data_offset: None,
            sound_block_size: None,
            raw_header_bytes: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// True if any structural error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The raw header formatted as hex pairs.
    pub fn hex_header(&self) -> String {
        hex_bytes(&self.raw_header_bytes)
    }
}
