//! Bounded little-endian reads over a byte slice.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::ParseError;

/// A cursor over one chunk of buffer data.
///
/// Every read is bounds-checked against the chunk; running past the end is
/// reported as [`ParseError::InsufficientData`], never as a panic. Nested
/// structures split off sub-readers so a malformed inner frame can not
/// consume bytes belonging to its siblings.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the given data.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// How many bytes are left in the chunk.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Takes `len` raw bytes from the current position.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if len > self.remaining() {
            return Err(ParseError::InsufficientData {
                needed: len,
                got: self.remaining(),
            });
        }

        let data = self.data;
        let chunk = &data[self.pos..self.pos + len];
        self.pos += len;

        Ok(chunk)
    }

    /// Moves the current position forward without reading.
    pub fn skip(&mut self, len: usize) -> Result<(), ParseError> {
        self.take(len).map(|_| ())
    }

    /// Splits off a sub-reader for the next `len` bytes.
    pub fn sub(&mut self, len: usize) -> Result<Reader<'a>, ParseError> {
        Ok(Reader::new(self.take(len)?))
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ParseError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, ParseError> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, ParseError> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, ParseError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }
}
