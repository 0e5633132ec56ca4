//! Per-version feature tables and the codec factory.
//!
//! A [`Codec`] value pairs a protocol version number with the set of struct
//! signatures that version decodes and the set of value kinds it encodes.
//! The tables are immutable after construction and shared freely across
//! threads; moving to a newer protocol version is a table swap, not a
//! rewrite.

use crate::buf::{PackInput, PackOutput};
use crate::parse::Unpacker;
use crate::write::Packer;

/// Struct signature bytes, chosen to be ASCII for readability.
pub mod signature {
    pub const NODE: u8 = b'N';
    pub const RELATIONSHIP: u8 = b'R';
    pub const UNBOUND_RELATIONSHIP: u8 = b'r';
    pub const PATH: u8 = b'P';

    // Introduced by protocol version 2.
    pub const DATE: u8 = b'D';
    pub const TIME: u8 = b'T';
    pub const LOCAL_TIME: u8 = b't';
    pub const LOCAL_DATE_TIME: u8 = b'd';
    pub const DATE_TIME: u8 = b'F';
    pub const DATE_TIME_ZONE_ID: u8 = b'f';
    pub const DURATION: u8 = b'E';
    pub const POINT_2D: u8 = b'X';
    pub const POINT_3D: u8 = b'Y';
}

/// Number of fields carried by each graph struct.
pub const NODE_SIZE: usize = 3;
pub const RELATIONSHIP_SIZE: usize = 5;
pub const UNBOUND_RELATIONSHIP_SIZE: usize = 3;
pub const PATH_SIZE: usize = 3;

/// Every struct signature known to any protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StructKind {
    Node,
    Relationship,
    UnboundRelationship,
    Path,
    Date,
    Time,
    LocalTime,
    LocalDateTime,
    DateTime,
    DateTimeZoneId,
    Duration,
    Point2d,
    Point3d,
}

impl StructKind {
    pub(crate) fn from_signature(signature: u8) -> Option<Self> {
        match signature {
            signature::NODE => Some(StructKind::Node),
            signature::RELATIONSHIP => Some(StructKind::Relationship),
            signature::UNBOUND_RELATIONSHIP => Some(StructKind::UnboundRelationship),
            signature::PATH => Some(StructKind::Path),
            signature::DATE => Some(StructKind::Date),
            signature::TIME => Some(StructKind::Time),
            signature::LOCAL_TIME => Some(StructKind::LocalTime),
            signature::LOCAL_DATE_TIME => Some(StructKind::LocalDateTime),
            signature::DATE_TIME => Some(StructKind::DateTime),
            signature::DATE_TIME_ZONE_ID => Some(StructKind::DateTimeZoneId),
            signature::DURATION => Some(StructKind::Duration),
            signature::POINT_2D => Some(StructKind::Point2d),
            signature::POINT_3D => Some(StructKind::Point3d),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            StructKind::Node => "Node",
            StructKind::Relationship => "Relationship",
            StructKind::UnboundRelationship => "UnboundRelationship",
            StructKind::Path => "Path",
            StructKind::Date => "Date",
            StructKind::Time => "Time",
            StructKind::LocalTime => "LocalTime",
            StructKind::LocalDateTime => "LocalDateTime",
            StructKind::DateTime => "DateTime",
            StructKind::DateTimeZoneId => "DateTimeZoneId",
            StructKind::Duration => "Duration",
            StructKind::Point2d => "Point2D",
            StructKind::Point3d => "Point3D",
        }
    }

    /// Field count fixed per signature.
    pub(crate) fn field_count(self) -> usize {
        match self {
            StructKind::Node => NODE_SIZE,
            StructKind::Relationship => RELATIONSHIP_SIZE,
            StructKind::UnboundRelationship => UNBOUND_RELATIONSHIP_SIZE,
            StructKind::Path => PATH_SIZE,
            StructKind::Date | StructKind::LocalTime => 1,
            StructKind::Time | StructKind::LocalDateTime => 2,
            StructKind::DateTime | StructKind::DateTimeZoneId => 3,
            StructKind::Duration => 4,
            StructKind::Point2d => 3,
            StructKind::Point3d => 4,
        }
    }
}

const V1_STRUCTS: &[StructKind] = &[
    StructKind::Node,
    StructKind::Relationship,
    StructKind::UnboundRelationship,
    StructKind::Path,
];

/// A protocol version's codec: its version number plus the decode and
/// encode feature tables.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    version: u32,
    decodable: &'static [StructKind],
    encodable: &'static [StructKind],
}

impl Codec {
    /// Version 1: the four graph structs only; no temporal, duration or
    /// point values in either direction.
    pub const fn v1() -> Self {
        Self {
            version: 1,
            decodable: V1_STRUCTS,
            encodable: V1_STRUCTS,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn new_packer<O: PackOutput>(&self, output: O) -> Packer<O> {
        Packer::new(output, *self)
    }

    pub fn new_unpacker<I: PackInput>(&self, input: I) -> Unpacker<I> {
        Unpacker::new(input, *self)
    }

    pub(crate) fn decodes(&self, kind: StructKind) -> bool {
        self.decodable.contains(&kind)
    }

    pub(crate) fn encodes(&self, kind: StructKind) -> bool {
        self.encodable.contains(&kind)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::v1()
    }
}
