use byteorder::{BigEndian, ByteOrder};
use std::io;

/// Byte-oriented cursor over a packet payload.
///
/// Writes append to the underlying buffer and cannot fail; reads advance the
/// cursor and return `UnexpectedEof` when the buffer is exhausted. All
/// fixed-width integers use network (big-endian) order.
#[derive(Debug, Default)]
pub struct PacketBuffer {
    buffer: Vec<u8>,
    cursor: usize,
}

impl PacketBuffer {
    /// Creates an empty buffer with the cursor at 0.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    /// Creates a buffer over received bytes, ready for reading.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            cursor: 0,
        }
    }

    /// Returns the whole underlying buffer, written and unread bytes alike.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the buffer and returns the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    fn take(&mut self, count: usize) -> io::Result<&[u8]> {
        if self.cursor + count > self.buffer.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "need {} bytes, {} remaining",
                    count,
                    self.buffer.len() - self.cursor
                ),
            ));
        }
        let slice = &self.buffer[self.cursor..self.cursor + count];
        self.cursor += count;
        Ok(slice)
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn write_i16(&mut self, value: i16) {
        let mut bytes = [0u8; 2];
        BigEndian::write_i16(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn read_i16(&mut self) -> io::Result<i16> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        BigEndian::write_i32(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn write_i64(&mut self, value: i64) {
        let mut bytes = [0u8; 8];
        BigEndian::write_i64(&mut bytes, value);
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn read_i64(&mut self) -> io::Result<i64> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    /// Writes a VarInt: 7 bits per byte, least-significant group first, high
    /// bit set on every byte except the last.
    pub fn write_varint(&mut self, mut value: i32) {
        while (value & !0x7F) != 0 {
            self.buffer.push(((value & 0x7F) as u8) | 0x80);
            value = ((value as u32) >> 7) as i32;
        }
        self.buffer.push((value & 0x7F) as u8);
    }

    /// Reads a VarInt. Fails with `InvalidData` past 5 bytes, since a 32-bit
    /// value never encodes longer than that.
    pub fn read_varint(&mut self) -> io::Result<i32> {
        let mut result: i32 = 0;
        let mut shift = 0;

        loop {
            let byte = self.read_u8().map_err(|_| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "EOF while reading VarInt")
            })?;

            result |= ((byte & 0x7F) as i32) << shift;
            if (byte & 0x80) == 0 {
                return Ok(result);
            }

            shift += 7;
            if shift >= 32 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "VarInt too big"));
            }
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn read_bytes(&mut self, count: usize) -> io::Result<Vec<u8>> {
        Ok(self.take(count)?.to_vec())
    }
}
