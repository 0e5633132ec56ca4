//! The polymorphic writer contract the value model streams into, and the
//! supplier interface through which entity contents are materialized.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::PackResult;
use crate::value::{Node, Point, Relationship, UnboundRelationship, ValueMap};

/// Element kind of a homogeneous array, used to pick between the byte-array
/// encoding and the generic list encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Byte,
    Bool,
    Int,
    Float,
    String,
}

/// Capability set for streaming a value without materializing it.
///
/// Containers are length-prefixed: callers must know the size before
/// calling a `begin_*` method. The matching `end_*` calls are advisory
/// no-ops kept for symmetry.
pub trait ValueWriter {
    fn write_null(&mut self) -> PackResult<()>;

    fn write_bool(&mut self, value: bool) -> PackResult<()>;

    fn write_int(&mut self, value: i64) -> PackResult<()>;

    fn write_float(&mut self, value: f64) -> PackResult<()>;

    fn write_bytes(&mut self, bytes: &[u8]) -> PackResult<()>;

    fn write_string(&mut self, value: &str) -> PackResult<()>;

    fn begin_list(&mut self, size: usize) -> PackResult<()>;

    fn end_list(&mut self) -> PackResult<()> {
        Ok(())
    }

    fn begin_map(&mut self, size: usize) -> PackResult<()>;

    fn end_map(&mut self) -> PackResult<()> {
        Ok(())
    }

    fn begin_array(&mut self, size: usize, kind: ArrayKind) -> PackResult<()>;

    fn end_array(&mut self) -> PackResult<()> {
        Ok(())
    }

    fn write_node(&mut self, node: &Node) -> PackResult<()>;

    fn write_relationship(&mut self, relationship: &Relationship) -> PackResult<()>;

    fn write_unbound_relationship(
        &mut self,
        relationship: &UnboundRelationship,
    ) -> PackResult<()>;

    /// Writes a path given its traversal: `nodes` in visit order (one more
    /// than the number of steps) and the bound relationships per step.
    fn write_path(&mut self, nodes: &[Node], relationships: &[Relationship]) -> PackResult<()>;

    /// Id-only node write. The wire carries full values, so codecs refuse
    /// this with `ReferenceNotSerializable`.
    fn write_node_reference(&mut self, node_id: i64) -> PackResult<()>;

    /// Id-only relationship write; refused like [`Self::write_node_reference`].
    fn write_relationship_reference(&mut self, relationship_id: i64) -> PackResult<()>;

    /// Id-only path write; refused like [`Self::write_node_reference`].
    fn write_path_reference(
        &mut self,
        node_ids: &[i64],
        relationship_ids: &[i64],
    ) -> PackResult<()>;

    fn write_date(&mut self, date: NaiveDate) -> PackResult<()>;

    fn write_local_time(&mut self, time: NaiveTime) -> PackResult<()>;

    fn write_time(&mut self, time: NaiveTime, offset: FixedOffset) -> PackResult<()>;

    fn write_local_date_time(&mut self, datetime: NaiveDateTime) -> PackResult<()>;

    fn write_date_time(&mut self, datetime: DateTime<FixedOffset>) -> PackResult<()>;

    fn write_duration(
        &mut self,
        months: i64,
        days: i64,
        seconds: i64,
        nanos: i32,
    ) -> PackResult<()>;

    fn write_point(&mut self, point: &Point) -> PackResult<()>;
}

/// Why an entity's contents could not be read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyReadFailure {
    /// The entity was deleted inside the transaction doing the read. Path
    /// serialization swallows this and substitutes an empty property map.
    DeletedInThisTransaction,

    /// The entity was deleted by some other transaction. Never swallowed.
    DeletedByOtherTransaction,
}

/// Supplies entity contents that the store may materialize lazily.
pub trait PropertySupplier {
    fn relationship_properties<'a>(
        &self,
        relationship: &'a Relationship,
    ) -> Result<Cow<'a, ValueMap>, PropertyReadFailure>;
}

/// Reads properties straight off the in-memory value. Used when packing
/// fully materialized values.
pub struct Materialized;

impl PropertySupplier for Materialized {
    fn relationship_properties<'a>(
        &self,
        relationship: &'a Relationship,
    ) -> Result<Cow<'a, ValueMap>, PropertyReadFailure> {
        Ok(Cow::Borrowed(&relationship.properties))
    }
}
