//! PackStream marker byte constants and marker classification.

// Null
pub const NULL: u8 = 0xC0;

// Boolean
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Float (IEEE 754 double-precision)
pub const FLOAT_64: u8 = 0xC1;

// Integer (beyond TINY_INT range)
pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

// TINY_INT: single byte, range -16..=127
// Positive: 0x00..=0x7F (0..127)
// Negative: 0xF0..=0xFF (-16..-1)

// Bytes
pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;

// String
// TINY_STRING: 0x80..=0x8F (high nibble 0x8, low = byte length 0..15)
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

// List
// TINY_LIST: 0x90..=0x9F (high nibble 0x9, low = item count 0..15)
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;

// Map
// TINY_MAP: 0xA0..=0xAF (high nibble 0xA, low = entry count 0..15)
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

// Structure
// TINY_STRUCT: 0xB0..=0xBF (high nibble 0xB, low = field count 0..15)
pub const STRUCT_8: u8 = 0xDC;
pub const STRUCT_16: u8 = 0xDD;

// Sentinel emitted between streamed records by the session protocol.
pub const END_OF_STREAM: u8 = 0xDF;

// High-nibble masks for tiny types.
pub const TINY_STRING_NIBBLE: u8 = 0x80;
pub const TINY_LIST_NIBBLE: u8 = 0x90;
pub const TINY_MAP_NIBBLE: u8 = 0xA0;
pub const TINY_STRUCT_NIBBLE: u8 = 0xB0;

/// Logical type of the next encoded value, derived from its marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackType {
    Null,
    Bool,
    Int,
    Float,
    Bytes,
    String,
    List,
    Map,
    Struct,
    EndOfStream,
}

/// Classifies a marker byte. Returns `None` for the reserved markers that
/// no known encoder emits.
pub fn peek_type(marker: u8) -> Option<PackType> {
    match marker {
        0x00..=0x7F | 0xF0..=0xFF => Some(PackType::Int),
        0x80..=0x8F | STRING_8 | STRING_16 | STRING_32 => Some(PackType::String),
        0x90..=0x9F | LIST_8 | LIST_16 | LIST_32 => Some(PackType::List),
        0xA0..=0xAF | MAP_8 | MAP_16 | MAP_32 => Some(PackType::Map),
        0xB0..=0xBF | STRUCT_8 | STRUCT_16 => Some(PackType::Struct),
        NULL => Some(PackType::Null),
        FLOAT_64 => Some(PackType::Float),
        FALSE | TRUE => Some(PackType::Bool),
        INT_8 | INT_16 | INT_32 | INT_64 => Some(PackType::Int),
        BYTES_8 | BYTES_16 | BYTES_32 => Some(PackType::Bytes),
        END_OF_STREAM => Some(PackType::EndOfStream),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiny_markers() {
        assert_eq!(peek_type(0x00), Some(PackType::Int));
        assert_eq!(peek_type(0x2A), Some(PackType::Int));
        assert_eq!(peek_type(0x7F), Some(PackType::Int));
        assert_eq!(peek_type(0xF0), Some(PackType::Int));
        assert_eq!(peek_type(0xFF), Some(PackType::Int));
        assert_eq!(peek_type(0x80), Some(PackType::String));
        assert_eq!(peek_type(0x8F), Some(PackType::String));
        assert_eq!(peek_type(0x90), Some(PackType::List));
        assert_eq!(peek_type(0xA5), Some(PackType::Map));
        assert_eq!(peek_type(0xB3), Some(PackType::Struct));
    }

    #[test]
    fn test_fixed_markers() {
        assert_eq!(peek_type(NULL), Some(PackType::Null));
        assert_eq!(peek_type(TRUE), Some(PackType::Bool));
        assert_eq!(peek_type(FALSE), Some(PackType::Bool));
        assert_eq!(peek_type(FLOAT_64), Some(PackType::Float));
        assert_eq!(peek_type(INT_64), Some(PackType::Int));
        assert_eq!(peek_type(BYTES_32), Some(PackType::Bytes));
        assert_eq!(peek_type(STRUCT_16), Some(PackType::Struct));
        assert_eq!(peek_type(END_OF_STREAM), Some(PackType::EndOfStream));
    }

    #[test]
    fn test_reserved_markers() {
        for marker in [0xC4u8, 0xC5, 0xC6, 0xC7, 0xCF, 0xD3, 0xD7, 0xDB, 0xDE] {
            assert_eq!(peek_type(marker), None, "0x{marker:02X} must be reserved");
        }
    }
}
