//! The unpacker: a pull parser that reads one whole value per call,
//! dispatching on the marker byte and enforcing the wire invariants.

use std::io;

use bytes::Bytes;

use crate::buf::PackInput;
use crate::error::{UnpackError, UnpackErrorKind, UnpackResult};
use crate::marker::{self, PackType};
use crate::value::{Value, ValueMap};
use crate::version::{Codec, StructKind};

/// Decodes values from a [`PackInput`].
///
/// Stateless between calls apart from the running byte offset used to
/// annotate errors. Bound to one thread at a time.
pub struct Unpacker<I> {
    input: I,
    codec: Codec,
    offset: usize,
}

impl<I: PackInput> Unpacker<I> {
    pub(crate) fn new(input: I, codec: Codec) -> Self {
        Self {
            input,
            codec,
            offset: 0,
        }
    }

    /// Bytes consumed from the input so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Classifies the next value without consuming anything.
    pub fn peek_type(&mut self) -> UnpackResult<PackType> {
        let marker = self.input.peek_u8().map_err(|err| self.io_error(err))?;
        marker::peek_type(marker)
            .ok_or_else(|| self.malformed(format!("Unknown value marker: 0x{marker:02X}")))
    }

    /// Reads the next whole value. Returns `None` when the next marker is
    /// the end-of-stream sentinel, which is consumed.
    pub fn unpack_one(&mut self) -> UnpackResult<Option<Value>> {
        if self.peek_type()? == PackType::EndOfStream {
            self.read_u8()?;
            return Ok(None);
        }
        self.unpack_value().map(Some)
    }

    /// Reads the next whole value; the end-of-stream sentinel is not a
    /// value and fails here.
    pub(crate) fn unpack_value(&mut self) -> UnpackResult<Value> {
        match self.peek_type()? {
            PackType::Null => {
                self.read_u8()?;
                Ok(Value::Null)
            }
            PackType::Bool => self.unpack_bool().map(Value::Bool),
            PackType::Int => self.unpack_int().map(Value::Int),
            PackType::Float => self.unpack_float().map(Value::Float),
            PackType::Bytes => self.unpack_bytes().map(Value::Bytes),
            PackType::String => self.unpack_string().map(Value::String),
            PackType::List => self.unpack_list().map(Value::List),
            PackType::Map => self.unpack_map().map(Value::Map),
            PackType::Struct => self.unpack_struct(),
            PackType::EndOfStream => {
                Err(self.malformed("unexpected end-of-stream marker inside a value"))
            }
        }
    }

    pub fn unpack_bool(&mut self) -> UnpackResult<bool> {
        let marker = self.read_u8()?;
        match marker {
            marker::TRUE => Ok(true),
            marker::FALSE => Ok(false),
            _ => Err(self.malformed(format!("Expected a boolean, but got: 0x{marker:02X}"))),
        }
    }

    /// Reads an integer of any size class, widened to i64.
    pub fn unpack_int(&mut self) -> UnpackResult<i64> {
        let marker = self.read_u8()?;
        match marker {
            0x00..=0x7F => Ok(i64::from(marker)),
            0xF0..=0xFF => Ok(i64::from(marker as i8)),
            marker::INT_8 => Ok(i64::from(self.read_i8()?)),
            marker::INT_16 => Ok(i64::from(self.read_i16_be()?)),
            marker::INT_32 => Ok(i64::from(self.read_i32_be()?)),
            marker::INT_64 => self.read_i64_be(),
            _ => Err(self.malformed(format!("Expected an integer, but got: 0x{marker:02X}"))),
        }
    }

    pub fn unpack_float(&mut self) -> UnpackResult<f64> {
        let marker = self.read_u8()?;
        if marker != marker::FLOAT_64 {
            return Err(self.malformed(format!("Expected a float, but got: 0x{marker:02X}")));
        }
        self.read_f64_be()
    }

    pub fn unpack_string(&mut self) -> UnpackResult<String> {
        let marker = self.read_u8()?;
        let size = match marker {
            0x80..=0x8F => (marker & 0x0F) as usize,
            marker::STRING_8 => self.read_u8()? as usize,
            marker::STRING_16 => self.read_u16_be()? as usize,
            marker::STRING_32 => self.read_u32_be()? as usize,
            _ => return Err(self.malformed(format!("Expected a string, but got: 0x{marker:02X}"))),
        };
        let payload = self.take_payload(size)?;
        String::from_utf8(payload.to_vec()).map_err(|_| self.malformed("invalid UTF-8 in string"))
    }

    pub fn unpack_bytes(&mut self) -> UnpackResult<Bytes> {
        let marker = self.read_u8()?;
        let size = match marker {
            marker::BYTES_8 => self.read_u8()? as usize,
            marker::BYTES_16 => self.read_u16_be()? as usize,
            marker::BYTES_32 => self.read_u32_be()? as usize,
            _ => {
                return Err(
                    self.malformed(format!("Expected a byte array, but got: 0x{marker:02X}"))
                );
            }
        };
        self.take_payload(size)
    }

    pub fn unpack_list_header(&mut self) -> UnpackResult<usize> {
        let marker = self.read_u8()?;
        match marker {
            0x90..=0x9F => Ok((marker & 0x0F) as usize),
            marker::LIST_8 => Ok(self.read_u8()? as usize),
            marker::LIST_16 => Ok(self.read_u16_be()? as usize),
            marker::LIST_32 => Ok(self.read_u32_be()? as usize),
            _ => Err(self.malformed(format!("Expected a list, but got: 0x{marker:02X}"))),
        }
    }

    pub fn unpack_map_header(&mut self) -> UnpackResult<usize> {
        let marker = self.read_u8()?;
        match marker {
            0xA0..=0xAF => Ok((marker & 0x0F) as usize),
            marker::MAP_8 => Ok(self.read_u8()? as usize),
            marker::MAP_16 => Ok(self.read_u16_be()? as usize),
            marker::MAP_32 => Ok(self.read_u32_be()? as usize),
            _ => Err(self.malformed(format!("Expected a map, but got: 0x{marker:02X}"))),
        }
    }

    /// Reads a struct header, returning the field count and the signature
    /// byte.
    pub fn unpack_struct_header(&mut self) -> UnpackResult<(usize, u8)> {
        let marker = self.read_u8()?;
        let size = match marker {
            0xB0..=0xBF => (marker & 0x0F) as usize,
            marker::STRUCT_8 => self.read_u8()? as usize,
            marker::STRUCT_16 => self.read_u16_be()? as usize,
            _ => return Err(self.malformed(format!("Expected a struct, but got: 0x{marker:02X}"))),
        };
        let signature = self.read_u8()?;
        Ok((size, signature))
    }

    fn unpack_list(&mut self) -> UnpackResult<Vec<Value>> {
        let size = self.unpack_list_header()?;
        if size == 0 {
            return Ok(Vec::new());
        }
        // Each element costs at least one byte on the wire.
        self.check_declared_size(size)?;
        let mut items = Vec::with_capacity(size);
        for _ in 0..size {
            items.push(self.unpack_value()?);
        }
        Ok(items)
    }

    fn unpack_map(&mut self) -> UnpackResult<ValueMap> {
        let size = self.unpack_map_header()?;
        if size == 0 {
            return Ok(ValueMap::new());
        }
        self.check_declared_size(size)?;
        let mut map = ValueMap::with_capacity(size);
        for _ in 0..size {
            let key = match self.peek_type()? {
                PackType::String => self.unpack_string()?,
                PackType::Null => {
                    return Err(self.malformed(
                        "Value `null` is not supported as key in maps, \
                         must be a non-nullable string.",
                    ));
                }
                other => return Err(self.malformed(format!("Bad key type: {other:?}"))),
            };
            if map.contains_key(&key) {
                return Err(self.malformed(format!("Duplicate map key `{key}`.")));
            }
            let value = self.unpack_value()?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn unpack_struct(&mut self) -> UnpackResult<Value> {
        let (size, signature) = self.unpack_struct_header()?;
        let Some(kind) = StructKind::from_signature(signature) else {
            return Err(UnpackError::at(
                UnpackErrorKind::StructSignatureUnknown { signature },
                self.offset,
            ));
        };
        if !self.codec.decodes(kind) {
            return Err(self.struct_not_supported(kind));
        }
        let expected = kind.field_count();
        if size != expected {
            return Err(self.malformed(format!(
                "Invalid {} struct, expected {expected} fields, but got: {size}",
                kind.name()
            )));
        }
        match kind {
            StructKind::Node => self.unpack_node().map(Value::Node),
            StructKind::Relationship => self.unpack_relationship().map(Value::Relationship),
            StructKind::UnboundRelationship => self
                .unpack_unbound_relationship()
                .map(Value::UnboundRelationship),
            StructKind::Path => self.unpack_path().map(Value::Path),
            // Kinds a newer version decodes never pass the table check
            // above in this version.
            other => Err(self.struct_not_supported(other)),
        }
    }

    pub(crate) fn malformed(&self, message: impl Into<String>) -> UnpackError {
        UnpackError::at(
            UnpackErrorKind::MalformedFormat(message.into()),
            self.offset,
        )
    }

    fn struct_not_supported(&self, kind: StructKind) -> UnpackError {
        UnpackError::at(
            UnpackErrorKind::StructNotSupportedInThisVersion {
                name: kind.name(),
                version: self.codec.version(),
            },
            self.offset,
        )
    }

    fn io_error(&self, err: io::Error) -> UnpackError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            self.malformed("unexpected end of input")
        } else {
            UnpackError::at(UnpackErrorKind::Io(err), self.offset)
        }
    }

    /// Rejects a declared size larger than what the input can still
    /// provide, before anything is allocated for it.
    fn check_declared_size(&self, size: usize) -> UnpackResult<()> {
        let remaining = self.input.remaining();
        if size > remaining {
            return Err(self.malformed(format!(
                "Declared size {size} exceeds the {remaining} bytes remaining in the input"
            )));
        }
        Ok(())
    }

    fn take_payload(&mut self, size: usize) -> UnpackResult<Bytes> {
        self.check_declared_size(size)?;
        let payload = self
            .input
            .read_slice(size)
            .map_err(|err| self.io_error(err))?;
        self.offset += size;
        Ok(payload)
    }

    fn read_u8(&mut self) -> UnpackResult<u8> {
        let byte = self.input.read_u8().map_err(|err| self.io_error(err))?;
        self.offset += 1;
        Ok(byte)
    }

    fn read_i8(&mut self) -> UnpackResult<i8> {
        let value = self.input.read_i8().map_err(|err| self.io_error(err))?;
        self.offset += 1;
        Ok(value)
    }

    fn read_i16_be(&mut self) -> UnpackResult<i16> {
        let value = self.input.read_i16_be().map_err(|err| self.io_error(err))?;
        self.offset += 2;
        Ok(value)
    }

    fn read_i32_be(&mut self) -> UnpackResult<i32> {
        let value = self.input.read_i32_be().map_err(|err| self.io_error(err))?;
        self.offset += 4;
        Ok(value)
    }

    fn read_i64_be(&mut self) -> UnpackResult<i64> {
        let value = self.input.read_i64_be().map_err(|err| self.io_error(err))?;
        self.offset += 8;
        Ok(value)
    }

    fn read_u16_be(&mut self) -> UnpackResult<u16> {
        let value = self.input.read_u16_be().map_err(|err| self.io_error(err))?;
        self.offset += 2;
        Ok(value)
    }

    fn read_u32_be(&mut self) -> UnpackResult<u32> {
        let value = self.input.read_u32_be().map_err(|err| self.io_error(err))?;
        self.offset += 4;
        Ok(value)
    }

    fn read_f64_be(&mut self) -> UnpackResult<f64> {
        let value = self.input.read_f64_be().map_err(|err| self.io_error(err))?;
        self.offset += 8;
        Ok(value)
    }
}
