//! The packer: size-class selection, marker emission, and the
//! [`ValueWriter`] implementation that values stream into.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::buf::PackOutput;
use crate::error::{PackError, PackErrorKind, PackResult};
use crate::id_map::IdIndexMap;
use crate::marker;
use crate::traits::{ArrayKind, ValueWriter};
use crate::value::{Node, Point, Relationship, UnboundRelationship, Value};
use crate::version::{Codec, StructKind};

const INITIAL_PATH_CAPACITY: usize = 100;

/// Encodes values into a [`PackOutput`].
///
/// A packer is bound to one thread at a time and holds only the path
/// scratch maps between calls; those are reset at the start of every path.
pub struct Packer<O> {
    out: O,
    codec: Codec,
    pub(crate) node_indexes: IdIndexMap,
    pub(crate) relationship_indexes: IdIndexMap,
}

impl<O: PackOutput> Packer<O> {
    pub(crate) fn new(out: O, codec: Codec) -> Self {
        Self {
            out,
            codec,
            node_indexes: IdIndexMap::with_capacity(INITIAL_PATH_CAPACITY + 1),
            relationship_indexes: IdIndexMap::with_capacity(INITIAL_PATH_CAPACITY),
        }
    }

    /// Encodes one whole value.
    pub fn pack(&mut self, value: &Value) -> PackResult<()> {
        value.write_to(self)
    }

    pub fn flush(&mut self) -> PackResult<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Consumes the packer, returning the underlying output.
    pub fn into_inner(self) -> O {
        self.out
    }

    pub fn pack_null(&mut self) -> PackResult<()> {
        self.out.write_u8(marker::NULL)?;
        Ok(())
    }

    pub fn pack_bool(&mut self, value: bool) -> PackResult<()> {
        self.out
            .write_u8(if value { marker::TRUE } else { marker::FALSE })?;
        Ok(())
    }

    /// Encodes an integer in the smallest size class that holds it
    /// losslessly.
    pub fn pack_int(&mut self, value: i64) -> PackResult<()> {
        if (-16..=127).contains(&value) {
            self.out.write_u8(value as u8)?;
        } else if (-128..=-17).contains(&value) {
            self.out.write_u8(marker::INT_8)?;
            self.out.write_i8(value as i8)?;
        } else if (i64::from(i16::MIN)..=i64::from(i16::MAX)).contains(&value) {
            self.out.write_u8(marker::INT_16)?;
            self.out.write_i16_be(value as i16)?;
        } else if (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&value) {
            self.out.write_u8(marker::INT_32)?;
            self.out.write_i32_be(value as i32)?;
        } else {
            self.out.write_u8(marker::INT_64)?;
            self.out.write_i64_be(value)?;
        }
        Ok(())
    }

    pub fn pack_float(&mut self, value: f64) -> PackResult<()> {
        self.out.write_u8(marker::FLOAT_64)?;
        self.out.write_f64_be(value)?;
        Ok(())
    }

    pub fn pack_string(&mut self, value: &str) -> PackResult<()> {
        let bytes = value.as_bytes();
        self.pack_string_header(bytes.len())?;
        self.out.write_slice(bytes)?;
        Ok(())
    }

    pub fn pack_bytes(&mut self, bytes: &[u8]) -> PackResult<()> {
        self.pack_bytes_header(bytes.len())?;
        self.out.write_slice(bytes)?;
        Ok(())
    }

    pub fn pack_string_header(&mut self, size: usize) -> PackResult<()> {
        self.pack_sized_header(
            size,
            Some(marker::TINY_STRING_NIBBLE),
            marker::STRING_8,
            marker::STRING_16,
            Some(marker::STRING_32),
        )
    }

    /// Byte arrays have no tiny size class.
    pub fn pack_bytes_header(&mut self, size: usize) -> PackResult<()> {
        self.pack_sized_header(
            size,
            None,
            marker::BYTES_8,
            marker::BYTES_16,
            Some(marker::BYTES_32),
        )
    }

    pub fn pack_list_header(&mut self, size: usize) -> PackResult<()> {
        self.pack_sized_header(
            size,
            Some(marker::TINY_LIST_NIBBLE),
            marker::LIST_8,
            marker::LIST_16,
            Some(marker::LIST_32),
        )
    }

    pub fn pack_map_header(&mut self, size: usize) -> PackResult<()> {
        self.pack_sized_header(
            size,
            Some(marker::TINY_MAP_NIBBLE),
            marker::MAP_8,
            marker::MAP_16,
            Some(marker::MAP_32),
        )
    }

    /// Writes a struct header: size-classed field count, then the
    /// signature byte. Structs have no 32-bit size class.
    pub fn pack_struct_header(&mut self, size: usize, signature: u8) -> PackResult<()> {
        if size < 0x10 {
            self.out
                .write_u8(marker::TINY_STRUCT_NIBBLE | size as u8)?;
        } else if size < 0x100 {
            self.out.write_u8(marker::STRUCT_8)?;
            self.out.write_u8(size as u8)?;
        } else if size < 0x1_0000 {
            self.out.write_u8(marker::STRUCT_16)?;
            self.out.write_u16_be(size as u16)?;
        } else {
            return Err(PackError::new(PackErrorKind::ContentTooLarge(size)));
        }
        self.out.write_u8(signature)?;
        Ok(())
    }

    /// Emits the sentinel the session protocol places between streamed
    /// records.
    pub fn pack_end_of_stream(&mut self) -> PackResult<()> {
        self.out.write_u8(marker::END_OF_STREAM)?;
        Ok(())
    }

    fn pack_sized_header(
        &mut self,
        size: usize,
        tiny_nibble: Option<u8>,
        marker8: u8,
        marker16: u8,
        marker32: Option<u8>,
    ) -> PackResult<()> {
        if let Some(nibble) = tiny_nibble
            && size < 0x10
        {
            self.out.write_u8(nibble | size as u8)?;
        } else if size < 0x100 {
            self.out.write_u8(marker8)?;
            self.out.write_u8(size as u8)?;
        } else if size < 0x1_0000 {
            self.out.write_u8(marker16)?;
            self.out.write_u16_be(size as u16)?;
        } else if let Some(m32) = marker32
            && u32::try_from(size).is_ok()
        {
            self.out.write_u8(m32)?;
            self.out.write_u32_be(size as u32)?;
        } else {
            return Err(PackError::new(PackErrorKind::ContentTooLarge(size)));
        }
        Ok(())
    }

    pub(crate) fn require_encodable(&self, kind: StructKind) -> PackResult<()> {
        if self.codec.encodes(kind) {
            Ok(())
        } else {
            Err(PackError::new(
                PackErrorKind::TypeNotSupportedInThisVersion {
                    type_name: kind.name(),
                    version: self.codec.version(),
                },
            ))
        }
    }

}

impl<O: PackOutput> ValueWriter for Packer<O> {
    fn write_null(&mut self) -> PackResult<()> {
        self.pack_null()
    }

    fn write_bool(&mut self, value: bool) -> PackResult<()> {
        self.pack_bool(value)
    }

    fn write_int(&mut self, value: i64) -> PackResult<()> {
        self.pack_int(value)
    }

    fn write_float(&mut self, value: f64) -> PackResult<()> {
        self.pack_float(value)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> PackResult<()> {
        self.pack_bytes(bytes)
    }

    fn write_string(&mut self, value: &str) -> PackResult<()> {
        self.pack_string(value)
    }

    fn begin_list(&mut self, size: usize) -> PackResult<()> {
        self.pack_list_header(size)
    }

    fn begin_map(&mut self, size: usize) -> PackResult<()> {
        self.pack_map_header(size)
    }

    fn begin_array(&mut self, size: usize, kind: ArrayKind) -> PackResult<()> {
        match kind {
            ArrayKind::Byte => self.pack_bytes_header(size),
            _ => self.pack_list_header(size),
        }
    }

    fn write_node(&mut self, node: &Node) -> PackResult<()> {
        self.pack_node(node)
    }

    fn write_relationship(&mut self, relationship: &Relationship) -> PackResult<()> {
        self.pack_relationship(relationship)
    }

    fn write_unbound_relationship(
        &mut self,
        relationship: &UnboundRelationship,
    ) -> PackResult<()> {
        self.pack_unbound_relationship(relationship)
    }

    fn write_path(&mut self, nodes: &[Node], relationships: &[Relationship]) -> PackResult<()> {
        self.pack_path(nodes, relationships, &crate::traits::Materialized)
    }

    fn write_node_reference(&mut self, _node_id: i64) -> PackResult<()> {
        Err(PackError::new(PackErrorKind::ReferenceNotSerializable(
            "node",
        )))
    }

    fn write_relationship_reference(&mut self, _relationship_id: i64) -> PackResult<()> {
        Err(PackError::new(PackErrorKind::ReferenceNotSerializable(
            "relationship",
        )))
    }

    fn write_path_reference(
        &mut self,
        _node_ids: &[i64],
        _relationship_ids: &[i64],
    ) -> PackResult<()> {
        Err(PackError::new(PackErrorKind::ReferenceNotSerializable(
            "path",
        )))
    }

    // The temporal, duration and point writers below are version gating
    // hook points. No version with encoders for them exists yet; a version
    // 2 table routes into real encoders here.

    fn write_date(&mut self, _date: NaiveDate) -> PackResult<()> {
        self.require_encodable(StructKind::Date)
    }

    fn write_local_time(&mut self, _time: NaiveTime) -> PackResult<()> {
        self.require_encodable(StructKind::LocalTime)
    }

    fn write_time(&mut self, _time: NaiveTime, _offset: FixedOffset) -> PackResult<()> {
        self.require_encodable(StructKind::Time)
    }

    fn write_local_date_time(&mut self, _datetime: NaiveDateTime) -> PackResult<()> {
        self.require_encodable(StructKind::LocalDateTime)
    }

    fn write_date_time(&mut self, _datetime: DateTime<FixedOffset>) -> PackResult<()> {
        self.require_encodable(StructKind::DateTime)
    }

    fn write_duration(
        &mut self,
        _months: i64,
        _days: i64,
        _seconds: i64,
        _nanos: i32,
    ) -> PackResult<()> {
        self.require_encodable(StructKind::Duration)
    }

    fn write_point(&mut self, point: &Point) -> PackResult<()> {
        self.require_encodable(match point.z {
            Some(_) => StructKind::Point3d,
            None => StructKind::Point2d,
        })
    }
}
