//! Byte-exact header synthesis for WAVE and AIFF.
//!
//! WAVE fields are little-endian, AIFF fields big-endian. Players reject
//! headers that mix the two, so each layout is written by its own function.

use std::io::{self, Write};

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::container::ContainerKind;
use crate::float80;
use crate::format::{PcmFormat, WAVE_FORMAT_PCM};

/// Bytes of a WAVE header counted by the RIFF size field, excluding payload.
const WAVE_RIFF_OVERHEAD: u32 = 36;

/// Bytes of an AIFF header counted by the FORM size field, excluding payload.
const AIFF_FORM_OVERHEAD: u32 = 46;

/// Size of the `COMM` chunk body.
const AIFF_COMM_SIZE: u32 = 18;

/// Largest payload whose sizes still fit the 32-bit header fields.
pub fn max_payload_len(kind: ContainerKind) -> u64 {
    let overhead = match kind {
        ContainerKind::Wave => WAVE_RIFF_OVERHEAD,
        ContainerKind::Aiff => AIFF_FORM_OVERHEAD,
    };
    (u32::MAX - overhead) as u64
}

/// Writes a canonical header for `payload_len` bytes of PCM data.
///
/// The format is expected to have passed [`PcmFormat::validate`].
pub fn write_header<W: Write>(
    writer: &mut W,
    kind: ContainerKind,
    format: &PcmFormat,
    payload_len: u32,
) -> io::Result<()> {
    match kind {
        ContainerKind::Wave => write_wave_header(writer, format, payload_len),
        ContainerKind::Aiff => write_aiff_header(writer, format, payload_len),
    }
}

/// Returns the header as bytes: 44 for WAVE, 54 for AIFF.
pub fn synthesize(kind: ContainerKind, format: &PcmFormat, payload_len: u32) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(kind.header_len());
    write_header(&mut buffer, kind, format, payload_len).expect("writing to Vec should not fail");
    buffer
}

fn write_wave_header<W: Write>(writer: &mut W, format: &PcmFormat, payload_len: u32) -> io::Result<()> {
    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(WAVE_RIFF_OVERHEAD.saturating_add(payload_len))?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(WAVE_FORMAT_PCM)?;
    writer.write_u16::<LittleEndian>(format.channels)?;
    writer.write_u32::<LittleEndian>(format.sample_rate)?;
    writer.write_u32::<LittleEndian>(format.byte_rate())?;
    writer.write_u16::<LittleEndian>(format.block_align())?;
    writer.write_u16::<LittleEndian>(format.bits_per_sample)?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(payload_len)?;
    Ok(())
}

fn write_aiff_header<W: Write>(writer: &mut W, format: &PcmFormat, payload_len: u32) -> io::Result<()> {
    let block_align = format.block_align().max(1) as u32;

    // FORM header
    writer.write_all(b"FORM")?;
    writer.write_u32::<BigEndian>(AIFF_FORM_OVERHEAD.saturating_add(payload_len))?;
    writer.write_all(b"AIFF")?;

    // COMM chunk
    writer.write_all(b"COMM")?;
    writer.write_u32::<BigEndian>(AIFF_COMM_SIZE)?;
    writer.write_u16::<BigEndian>(format.channels)?;
    writer.write_u32::<BigEndian>(payload_len / block_align)?;
    writer.write_u16::<BigEndian>(format.bits_per_sample)?;
    writer.write_all(&float80::encode(format.sample_rate as f64))?;

    // SSND chunk: offset and block size stay zero
    writer.write_all(b"SSND")?;
    writer.write_u32::<BigEndian>(payload_len.saturating_add(8))?;
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u32::<BigEndian>(0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wave_header_layout() {
        let header = synthesize(ContainerKind::Wave, &PcmFormat::new(44100, 16, 2), 1000);
        assert_eq!(header.len(), 44);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"RIFF");
        expected.extend_from_slice(&1036u32.to_le_bytes());
        expected.extend_from_slice(b"WAVEfmt ");
        expected.extend_from_slice(&16u32.to_le_bytes());
        expected.extend_from_slice(&1u16.to_le_bytes());
        expected.extend_from_slice(&2u16.to_le_bytes());
        expected.extend_from_slice(&44100u32.to_le_bytes());
        expected.extend_from_slice(&176400u32.to_le_bytes());
        expected.extend_from_slice(&4u16.to_le_bytes());
        expected.extend_from_slice(&16u16.to_le_bytes());
        expected.extend_from_slice(b"data");
        expected.extend_from_slice(&1000u32.to_le_bytes());
        assert_eq!(header, expected);
    }

    #[test]
    fn aiff_header_layout() {
        let header = synthesize(ContainerKind::Aiff, &PcmFormat::new(48000, 24, 2), 600);
        assert_eq!(header.len(), 54);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"FORM");
        expected.extend_from_slice(&646u32.to_be_bytes());
        expected.extend_from_slice(b"AIFFCOMM");
        expected.extend_from_slice(&18u32.to_be_bytes());
        expected.extend_from_slice(&2u16.to_be_bytes());
        expected.extend_from_slice(&100u32.to_be_bytes()); // 600 / (2 * 3)
        expected.extend_from_slice(&24u16.to_be_bytes());
        expected.extend_from_slice(&[0x40, 0x0E, 0xBB, 0x80, 0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(b"SSND");
        expected.extend_from_slice(&608u32.to_be_bytes());
        expected.extend_from_slice(&[0u8; 8]);
        assert_eq!(header, expected);
    }

    #[test]
    fn aiff_frames_round_down() {
        let header = synthesize(ContainerKind::Aiff, &PcmFormat::new(44100, 16, 2), 1001);
        let frames = u32::from_be_bytes([header[22], header[23], header[24], header[25]]);
        assert_eq!(frames, 250);
    }

    #[test]
    fn write_header_streams_same_bytes() {
        let format = PcmFormat::default();
        let mut out = Vec::new();
        write_header(&mut out, ContainerKind::Aiff, &format, 10).unwrap();
        assert_eq!(out, synthesize(ContainerKind::Aiff, &format, 10));
    }

    #[test]
    fn max_payload_fits_size_fields() {
        assert_eq!(max_payload_len(ContainerKind::Wave) + 36, u32::MAX as u64);
        assert_eq!(max_payload_len(ContainerKind::Aiff) + 46, u32::MAX as u64);
    }
}
