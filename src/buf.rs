//! Byte-level sink and source contracts consumed by the codec.
//!
//! All multi-byte scalars cross the wire big-endian. The provided methods
//! here are the only place that byte order is spelled out; the packer and
//! unpacker go through them exclusively.

use std::io;

use bytes::Bytes;

/// Byte sink the packer emits into.
///
/// Implementations may buffer; a write is not observable on the wire until
/// the session protocol flushes the enclosing message.
pub trait PackOutput {
    fn write_u8(&mut self, byte: u8) -> io::Result<()>;

    fn write_slice(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn write_i8(&mut self, value: i8) -> io::Result<()> {
        self.write_u8(value as u8)
    }

    fn write_i16_be(&mut self, value: i16) -> io::Result<()> {
        self.write_slice(&value.to_be_bytes())
    }

    fn write_i32_be(&mut self, value: i32) -> io::Result<()> {
        self.write_slice(&value.to_be_bytes())
    }

    fn write_i64_be(&mut self, value: i64) -> io::Result<()> {
        self.write_slice(&value.to_be_bytes())
    }

    fn write_u16_be(&mut self, value: u16) -> io::Result<()> {
        self.write_slice(&value.to_be_bytes())
    }

    fn write_u32_be(&mut self, value: u32) -> io::Result<()> {
        self.write_slice(&value.to_be_bytes())
    }

    fn write_f64_be(&mut self, value: f64) -> io::Result<()> {
        self.write_slice(&value.to_be_bytes())
    }
}

impl PackOutput for Vec<u8> {
    fn write_u8(&mut self, byte: u8) -> io::Result<()> {
        self.push(byte);
        Ok(())
    }

    fn write_slice(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<O: PackOutput + ?Sized> PackOutput for &mut O {
    fn write_u8(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_u8(byte)
    }

    fn write_slice(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_slice(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Byte source the unpacker reads from.
///
/// `peek_u8` does not consume. `remaining` reports how many bytes are still
/// readable; the unpacker checks declared container sizes against it before
/// allocating. A transport-backed implementation must buffer enough bytes
/// for the value being decoded, or surface a would-block as an I/O error.
pub trait PackInput {
    fn peek_u8(&mut self) -> io::Result<u8>;

    fn read_u8(&mut self) -> io::Result<u8>;

    /// Reads the next `n` bytes. The returned buffer owns or references the
    /// underlying storage; in-memory sources hand out zero-copy slices.
    fn read_slice(&mut self, n: usize) -> io::Result<Bytes>;

    fn remaining(&self) -> usize;

    fn read_i8(&mut self) -> io::Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    fn read_i16_be(&mut self) -> io::Result<i16> {
        let bytes = self.read_slice(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_i32_be(&mut self) -> io::Result<i32> {
        let bytes = self.read_slice(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i64_be(&mut self) -> io::Result<i64> {
        let bytes = self.read_slice(8)?;
        Ok(i64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    fn read_u16_be(&mut self) -> io::Result<u16> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_be(&mut self) -> io::Result<u32> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_f64_be(&mut self) -> io::Result<f64> {
        let bytes = self.read_slice(8)?;
        Ok(f64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }
}

/// In-memory input over a [`Bytes`] buffer. Slices handed out by
/// `read_slice` share the buffer without copying.
pub struct BytesInput {
    data: Bytes,
}

impl BytesInput {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for BytesInput {
    fn from(data: Vec<u8>) -> Self {
        Self::new(Bytes::from(data))
    }
}

impl PackInput for BytesInput {
    fn peek_u8(&mut self) -> io::Result<u8> {
        self.data
            .first()
            .copied()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    }

    fn read_u8(&mut self) -> io::Result<u8> {
        let byte = self.peek_u8()?;
        let _ = self.data.split_to(1);
        Ok(byte)
    }

    fn read_slice(&mut self, n: usize) -> io::Result<Bytes> {
        if n > self.data.len() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        Ok(self.data.split_to(n))
    }

    fn remaining(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_input_reads() {
        let mut input = BytesInput::from(vec![0x01u8, 0x02, 0x03, 0x04]);
        assert_eq!(input.remaining(), 4);
        assert_eq!(input.peek_u8().unwrap(), 0x01);
        assert_eq!(input.read_u8().unwrap(), 0x01);
        assert_eq!(input.read_u16_be().unwrap(), 0x0203);
        assert_eq!(input.remaining(), 1);
        assert_eq!(input.read_u8().unwrap(), 0x04);
        assert!(input.read_u8().is_err());
    }

    #[test]
    fn test_bytes_input_slice_is_zero_copy() {
        let mut input = BytesInput::from(vec![0xAAu8, 0xBB, 0xCC]);
        let slice = input.read_slice(2).unwrap();
        assert_eq!(&slice[..], &[0xAA, 0xBB]);
        assert_eq!(input.remaining(), 1);
        assert!(input.read_slice(2).is_err());
    }

    #[test]
    fn test_vec_output_is_big_endian() {
        let mut out = Vec::new();
        out.write_i16_be(-2).unwrap();
        out.write_u32_be(0x0102_0304).unwrap();
        out.write_f64_be(1.0).unwrap();
        assert_eq!(
            out,
            [
                0xFF, 0xFE, 0x01, 0x02, 0x03, 0x04, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00
            ]
        );
    }
}
