//! Chunk walker for RIFF/WAVE and FORM/AIFF buffers.
//!
//! Parsing never fails. Out-of-bounds reads, unknown chunks and inconsistent
//! size fields are turned into records on the [`HeaderReport`], so a single
//! malformed chunk never hides what the rest of the file says.

use tracing::debug;

use crate::container::{ContainerKind, Endianness};
use crate::error::ReadError;
use crate::float80;
use crate::format::{FormatInfo, WAVE_FORMAT_PCM};
use crate::reader::ChunkReader;
use crate::report::{tag_str, HeaderError, HeaderNote, HeaderReport, HeaderWarning};

/// Offset of the first sub-chunk, after magic, size and form type.
const FIRST_CHUNK_OFFSET: usize = 12;

/// Size of a chunk header (tag + declared size).
const CHUNK_HEADER_LEN: usize = 8;

/// How the walk treats a chunk, decided by its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkClass {
    Format,
    Data,
    Other,
}

fn classify(kind: ContainerKind, tag: &[u8; 4]) -> ChunkClass {
    if tag == kind.format_tag() {
        ChunkClass::Format
    } else if tag == kind.data_tag() {
        ChunkClass::Data
    } else {
        ChunkClass::Other
    }
}

fn is_printable(tag: &[u8; 4]) -> bool {
    tag.iter().all(|b| (0x20..=0x7E).contains(b))
}

/// Inspects a buffer, detecting the container kind from its magic.
pub fn parse(buffer: &[u8]) -> HeaderReport {
    match ContainerKind::detect(buffer) {
        Some(kind) => ContainerParser::new(kind, buffer).parse(),
        None => {
            let mut report = HeaderReport::new(buffer.len() as u64, None);
            let shown = buffer.len().min(ContainerKind::Wave.header_len());
            report.raw_header_bytes = buffer[..shown].to_vec();
            report.errors.push(HeaderError::MissingMagic { expected: None });
            report
        }
    }
}

/// Inspects a buffer as the given container kind.
pub fn parse_as(kind: ContainerKind, buffer: &[u8]) -> HeaderReport {
    ContainerParser::new(kind, buffer).parse()
}

/// Single-use parser over one buffer.
pub struct ContainerParser<'a> {
    kind: ContainerKind,
    buffer: &'a [u8],
    reader: ChunkReader<'a>,
    report: HeaderReport,
}

impl<'a> ContainerParser<'a> {
    pub fn new(kind: ContainerKind, buffer: &'a [u8]) -> Self {
        let mut report = HeaderReport::new(buffer.len() as u64, Some(kind));
        let shown = buffer.len().min(kind.header_len());
        report.raw_header_bytes = buffer[..shown].to_vec();

        Self {
            kind,
            buffer,
            reader: ChunkReader::new(buffer),
            report,
        }
    }

    fn endianness(&self) -> Endianness {
        self.kind.endianness()
    }

    fn file_size(&self) -> u64 {
        self.buffer.len() as u64
    }

    /// Runs the full inspection and returns the report.
    pub fn parse(mut self) -> HeaderReport {
        if self.read_outer_header() {
            if self.buffer.len() < self.kind.header_len() {
                self.report.errors.push(HeaderError::FileTooShort {
                    kind: self.kind,
                    file_size: self.file_size(),
                });
            }
            self.walk();
            self.check_consistency();
        }
        self.report
    }

    /// Validates magic, outer size and form type. Returns false when the walk
    /// cannot start.
    fn read_outer_header(&mut self) -> bool {
        if self.buffer.get(0..4) != Some(&self.kind.magic()[..]) {
            self.report.errors.push(HeaderError::MissingMagic {
                expected: Some(self.kind),
            });
            return false;
        }

        let e = self.endianness();
        let reader = &mut self.reader;
        let outer = reader.seek(4).and_then(|_| {
            let size = reader.read_u32(e)?;
            let form_type = reader.read_fourcc()?;
            Ok((size, form_type))
        });
        let (chunk_size, form_type) = match outer {
            Ok(outer) => outer,
            Err(source) => {
                // The size field may still be readable even if the form type is not.
                self.report.declared_chunk_size = self.read_u32_at(4).ok();
                self.report.errors.push(HeaderError::TruncatedHeader {
                    kind: self.kind,
                    source,
                });
                return false;
            }
        };

        self.report.declared_chunk_size = Some(chunk_size);
        let expected = self.file_size().saturating_sub(8);
        if chunk_size as u64 != expected {
            self.report.warnings.push(HeaderWarning::ChunkSizeMismatch {
                expected,
                actual: chunk_size,
            });
        }

        if &form_type != self.kind.form_type() {
            self.report
                .errors
                .push(HeaderError::FormTypeMismatch { kind: self.kind });
            return false;
        }
        true
    }

    fn read_u32_at(&self, offset: usize) -> Result<u32, ReadError> {
        let mut reader = ChunkReader::new(self.buffer);
        reader.seek(offset)?;
        reader.read_u32(self.endianness())
    }

    fn walk(&mut self) {
        let len = self.buffer.len();
        let e = self.endianness();
        if self.reader.seek(FIRST_CHUNK_OFFSET).is_err() {
            return;
        }

        loop {
            let offset = self.reader.position();
            let remaining = self.reader.peek_remaining();
            if remaining == 0 {
                break;
            }
            if remaining < CHUNK_HEADER_LEN {
                self.report.warnings.push(HeaderWarning::TrailingBytes {
                    offset: offset as u64,
                    len: remaining as u64,
                });
                break;
            }

            let (Ok(tag), Ok(size)) = (self.reader.read_fourcc(), self.reader.read_u32(e)) else {
                break;
            };

            if !is_printable(&tag) {
                if self.report.declared_data_size.is_some() {
                    // Audio data past an undersized data chunk, covered by the data size check.
                    self.report.notes.push(HeaderNote::UnparsedTail {
                        offset: offset as u64,
                        len: remaining as u64,
                    });
                } else {
                    self.report.errors.push(HeaderError::InvalidChunkName {
                        offset: offset as u64,
                        bytes: tag,
                    });
                }
                return;
            }

            let body = offset + CHUNK_HEADER_LEN;
            let class = classify(self.kind, &tag);
            debug!(tag = %tag_str(&tag), offset, size, ?class, "chunk");

            match class {
                ChunkClass::Format => self.read_format_chunk(tag, body, size),
                ChunkClass::Data => self.read_data_chunk(tag, body, size),
                ChunkClass::Other => self.report.notes.push(HeaderNote::SkippedChunk {
                    tag,
                    offset: offset as u64,
                    size,
                }),
            }

            let next = body as u64 + size as u64;
            if next > len as u64 {
                // An oversized data chunk is reported by the data size check.
                if class != ChunkClass::Data {
                    self.report.warnings.push(HeaderWarning::IncompleteWalk {
                        tag,
                        offset: offset as u64,
                        declared: size,
                        remaining: (len - body) as u64,
                    });
                }
                break;
            }

            // Odd-sized bodies carry one pad byte; a pad missing at EOF is tolerated.
            let padded = (next + (size as u64 & 1)).min(len as u64) as usize;
            if self.reader.seek(padded).is_err() {
                break;
            }
        }
    }

    fn read_format_chunk(&mut self, tag: [u8; 4], body: usize, size: u32) {
        if self.report.format_chunk_size.is_some() {
            self.report.warnings.push(HeaderWarning::DuplicateChunk {
                tag,
                offset: (body - CHUNK_HEADER_LEN) as u64,
            });
            return;
        }
        self.report.format_chunk_size = Some(size);

        let minimum = self.kind.min_format_chunk_size();
        if size < minimum {
            self.report.warnings.push(HeaderWarning::FormatChunkTooSmall {
                tag,
                declared: size,
                minimum,
            });
        }

        // Limit the reader to the declared body so short chunks fail their reads.
        let buffer = self.buffer;
        let kind = self.kind;
        let end = (body as u64 + size as u64).min(self.file_size()) as usize;
        let mut reader = ChunkReader::new(&buffer[..end]);
        let parsed = reader.seek(body).and_then(|_| match kind {
            ContainerKind::Wave => read_fmt(&mut reader),
            ContainerKind::Aiff => read_comm(&mut reader),
        });

        match parsed {
            Ok(info) => self.report.format_info = Some(info),
            Err(source) => self.report.errors.push(HeaderError::UnreadableFormatChunk {
                tag,
                offset: (body - CHUNK_HEADER_LEN) as u64,
                source,
            }),
        }
    }

    fn read_data_chunk(&mut self, tag: [u8; 4], body: usize, size: u32) {
        if self.report.declared_data_size.is_some() {
            self.report.warnings.push(HeaderWarning::DuplicateChunk {
                tag,
                offset: (body - CHUNK_HEADER_LEN) as u64,
            });
            return;
        }
        self.report.declared_data_size = Some(size);
        self.report.data_offset = Some(body as u64);

        if self.kind == ContainerKind::Aiff {
            let mut reader = ChunkReader::new(self.buffer);
            let prologue = reader.seek(body).and_then(|_| {
                let offset = reader.read_u32(Endianness::Big)?;
                let block_size = reader.read_u32(Endianness::Big)?;
                Ok((offset, block_size))
            });
            if let Ok((offset, block_size)) = prologue {
                self.report.sound_data_offset = Some(offset);
                self.report.sound_block_size = Some(block_size);
            }
        }
    }

    fn check_consistency(&mut self) {
        if self.report.format_chunk_size.is_none() {
            self.report.errors.push(HeaderError::MissingChunk {
                tag: *self.kind.format_tag(),
            });
        }
        if self.report.declared_data_size.is_none() {
            self.report.errors.push(HeaderError::MissingChunk {
                tag: *self.kind.data_tag(),
            });
        }

        if let Some(info) = self.report.format_info.clone() {
            self.check_format(&info);
        }

        if let (Some(declared), Some(data_offset)) =
            (self.report.declared_data_size, self.report.data_offset)
        {
            let available = self.file_size().saturating_sub(data_offset);
            if declared as u64 != available {
                self.report.warnings.push(HeaderWarning::DataSizeMismatch {
                    declared,
                    available,
                });
            }
        }
    }

    fn check_format(&mut self, info: &FormatInfo) {
        if info.channels < 1 {
            self.report.errors.push(HeaderError::InvalidChannels);
        }
        if info.sample_rate < 1 {
            self.report.errors.push(HeaderError::InvalidSampleRate);
        }
        if info.bits_per_sample < 1 {
            self.report.errors.push(HeaderError::InvalidBitsPerSample);
        }

        match self.kind {
            ContainerKind::Wave => {
                if info.audio_format != WAVE_FORMAT_PCM {
                    self.report
                        .warnings
                        .push(HeaderWarning::UnsupportedAudioFormat {
                            audio_format: info.audio_format,
                        });
                }
                let expected = info.expected_block_align();
                if info.block_align as u64 != expected {
                    self.report.warnings.push(HeaderWarning::BlockAlignMismatch {
                        expected,
                        actual: info.block_align,
                    });
                }
                let expected = info.expected_byte_rate();
                if info.byte_rate as u64 != expected {
                    self.report.warnings.push(HeaderWarning::ByteRateMismatch {
                        expected,
                        actual: info.byte_rate,
                    });
                }
            }
            ContainerKind::Aiff => {
                if let (Some(frames), Some(declared)) =
                    (info.sample_frames, self.report.declared_data_size)
                {
                    if info.block_align > 0 {
                        let expected = declared.saturating_sub(8) as u64 / info.block_align as u64;
                        if frames as u64 != expected {
                            self.report
                                .warnings
                                .push(HeaderWarning::FrameCountMismatch { frames, expected });
                        }
                    }
                }
            }
        }
    }
}

fn read_fmt(reader: &mut ChunkReader<'_>) -> Result<FormatInfo, ReadError> {
    let e = Endianness::Little;
    Ok(FormatInfo {
        audio_format: reader.read_u16(e)?,
        channels: reader.read_u16(e)?,
        sample_rate: reader.read_u32(e)?,
        byte_rate: reader.read_u32(e)?,
        block_align: reader.read_u16(e)?,
        bits_per_sample: reader.read_u16(e)?,
        sample_frames: None,
        extended_sample_rate: None,
    })
}

fn read_comm(reader: &mut ChunkReader<'_>) -> Result<FormatInfo, ReadError> {
    let e = Endianness::Big;
    let channels = reader.read_u16(e)?;
    let sample_frames = reader.read_u32(e)?;
    let bits_per_sample = reader.read_u16(e)?;
    let rate = float80::decode(&reader.read_extended()?);

    // Samples are stored in whole bytes, left-justified.
    let bytes_per_sample = (bits_per_sample as u32).div_ceil(8);
    let block_align = u16::try_from(channels as u32 * bytes_per_sample).unwrap_or(u16::MAX);
    // `as` saturates and maps NaN to zero, which the validity check reports.
    let sample_rate = rate.round() as u32;

    Ok(FormatInfo {
        audio_format: WAVE_FORMAT_PCM,
        channels,
        sample_rate,
        byte_rate: sample_rate.saturating_mul(block_align as u32),
        block_align,
        bits_per_sample,
        sample_frames: Some(sample_frames),
        extended_sample_rate: Some(rate),
    })
}
