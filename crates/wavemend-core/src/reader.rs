//! Bounds-checked cursor over an immutable byte buffer.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::container::Endianness;
use crate::error::ReadError;

/// Read cursor over a borrowed buffer.
///
/// Every read either returns the requested span or fails with
/// [`ReadError::OutOfBounds`] without moving the cursor.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    /// Creates a reader positioned at offset 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current absolute offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn peek_remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Moves the cursor to an absolute offset.
    ///
    /// Seeking to exactly the end of the buffer is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<(), ReadError> {
        if offset > self.data.len() {
            return Err(self.out_of_bounds(offset, 0));
        }
        self.pos = offset;
        Ok(())
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.out_of_bounds(self.pos, len))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a fixed-length tag such as a chunk identifier.
    pub fn read_tag(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        self.read_bytes(len)
    }

    /// Reads a 4-byte chunk identifier.
    pub fn read_fourcc(&mut self) -> Result<[u8; 4], ReadError> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn read_u16(&mut self, endianness: Endianness) -> Result<u16, ReadError> {
        let bytes = self.read_bytes(2)?;
        Ok(match endianness {
            Endianness::Little => LittleEndian::read_u16(bytes),
            Endianness::Big => BigEndian::read_u16(bytes),
        })
    }

    pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32, ReadError> {
        let bytes = self.read_bytes(4)?;
        Ok(match endianness {
            Endianness::Little => LittleEndian::read_u32(bytes),
            Endianness::Big => BigEndian::read_u32(bytes),
        })
    }

    /// Reads a 10-byte big-endian extended float (AIFF sample rate).
    pub fn read_extended(&mut self) -> Result<[u8; 10], ReadError> {
        let bytes = self.read_bytes(10)?;
        let mut out = [0u8; 10];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn out_of_bounds(&self, offset: usize, len: usize) -> ReadError {
        ReadError::OutOfBounds {
            offset,
            len,
            available: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_endiannesses() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut r = ChunkReader::new(&data);
        assert_eq!(r.read_u16(Endianness::Little).unwrap(), 0x0201);
        assert_eq!(r.read_u16(Endianness::Big).unwrap(), 0x0304);

        let mut r = ChunkReader::new(&data);
        assert_eq!(r.read_u32(Endianness::Little).unwrap(), 0x0403_0201);
        r.seek(0).unwrap();
        assert_eq!(r.read_u32(Endianness::Big).unwrap(), 0x0102_0304);
        assert_eq!(r.peek_remaining(), 0);
    }

    #[test]
    fn out_of_bounds_does_not_advance() {
        let data = b"RIFF\x10";
        let mut r = ChunkReader::new(data);
        assert_eq!(r.read_fourcc().unwrap(), *b"RIFF");
        let err = r.read_u32(Endianness::Little).unwrap_err();
        assert_eq!(
            err,
            ReadError::OutOfBounds {
                offset: 4,
                len: 4,
                available: 5
            }
        );
        assert_eq!(r.position(), 4);
        assert_eq!(r.peek_remaining(), 1);
    }

    #[test]
    fn seek_bounds() {
        let data = [0u8; 8];
        let mut r = ChunkReader::new(&data);
        assert!(r.seek(8).is_ok());
        assert_eq!(r.peek_remaining(), 0);
        assert!(r.seek(9).is_err());
        assert_eq!(r.position(), 8);
    }

    #[test]
    fn read_tag_returns_slice() {
        let data = b"JUNKxyz";
        let mut r = ChunkReader::new(data);
        assert_eq!(r.read_tag(4).unwrap(), b"JUNK");
        assert!(r.read_tag(4).is_err());
        assert_eq!(r.read_tag(3).unwrap(), b"xyz");
    }
}
