//! The in-memory value model the codec packs and unpacks.

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::PackResult;
use crate::traits::ValueWriter;

/// Any value that can cross the wire.
///
/// Integers are always widened to `i64` on decode regardless of the size
/// class they arrived in. Temporal, duration and point variants exist in the
/// model but are rejected by the version 1 encoder; no version 1 struct
/// signature produces them on decode either.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value (no content).
    Null,

    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer.
    Int(i64),

    /// IEEE-754 double-precision float.
    Float(f64),

    /// Raw byte array.
    Bytes(Bytes),

    /// UTF-8 string.
    String(String),

    /// Ordered, heterogeneous list.
    List(Vec<Value>),

    /// String-keyed map with unique keys; see [`ValueMap`].
    Map(ValueMap),

    /// A graph node.
    Node(Node),

    /// A graph relationship bound to its start and end nodes.
    Relationship(Relationship),

    /// A relationship without start/end ids, as carried inside paths.
    UnboundRelationship(UnboundRelationship),

    /// A graph traversal; see [`Path`].
    Path(Path),

    Date(NaiveDate),

    LocalTime(NaiveTime),

    /// Time of day with a fixed UTC offset.
    Time(NaiveTime, FixedOffset),

    LocalDateTime(NaiveDateTime),

    DateTime(DateTime<FixedOffset>),

    Duration(Duration),

    Point(Point),
}

impl Value {
    /// Streams this value into a [`ValueWriter`], dispatching per variant.
    pub fn write_to<W: ValueWriter>(&self, writer: &mut W) -> PackResult<()> {
        match self {
            Value::Null => writer.write_null(),
            Value::Bool(v) => writer.write_bool(*v),
            Value::Int(v) => writer.write_int(*v),
            Value::Float(v) => writer.write_float(*v),
            Value::Bytes(v) => writer.write_bytes(v),
            Value::String(v) => writer.write_string(v),
            Value::List(items) => {
                writer.begin_list(items.len())?;
                for item in items {
                    item.write_to(writer)?;
                }
                writer.end_list()
            }
            Value::Map(map) => map.write_to(writer),
            Value::Node(node) => writer.write_node(node),
            Value::Relationship(rel) => writer.write_relationship(rel),
            Value::UnboundRelationship(rel) => writer.write_unbound_relationship(rel),
            Value::Path(path) => {
                let (nodes, relationships) = path.rebind();
                writer.write_path(&nodes, &relationships)
            }
            Value::Date(date) => writer.write_date(*date),
            Value::LocalTime(time) => writer.write_local_time(*time),
            Value::Time(time, offset) => writer.write_time(*time, *offset),
            Value::LocalDateTime(datetime) => writer.write_local_date_time(*datetime),
            Value::DateTime(datetime) => writer.write_date_time(*datetime),
            Value::Duration(d) => writer.write_duration(d.months, d.days, d.seconds, d.nanos),
            Value::Point(point) => writer.write_point(point),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// String-keyed map preserving insertion order.
///
/// Keys are unique by construction: `insert` replaces the value of an
/// existing key. Decoded maps keep the key order observed on the wire, but
/// equality compares the key set and values only.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a key-value pair, returning the previous value if the key
    /// was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Streams this map into a [`ValueWriter`].
    pub fn write_to<W: ValueWriter>(&self, writer: &mut W) -> PackResult<()> {
        writer.begin_map(self.entries.len())?;
        for (key, value) in &self.entries {
            writer.write_string(key)?;
            value.write_to(writer)?;
        }
        writer.end_map()
    }
}

impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Value); N]> for ValueMap {
    fn from(entries: [(K, Value); N]) -> Self {
        let mut map = ValueMap::with_capacity(N);
        for (key, value) in entries {
            map.insert(key, value);
        }
        map
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A node with its labels and properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: ValueMap,
}

/// A relationship bound to its start and end node ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: i64,
    pub start_id: i64,
    pub end_id: i64,
    pub rel_type: String,
    pub properties: ValueMap,
}

/// A relationship stripped of its start and end node ids. Inside a path the
/// endpoints are recoverable from the traversal order, so the wire omits
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct UnboundRelationship {
    pub id: i64,
    pub rel_type: String,
    pub properties: ValueMap,
}

/// Violation of the path structure invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("a path must contain at least one node")]
    NoNodes,

    #[error("path index array length {0} is odd")]
    OddIndexCount(usize),

    #[error("a path of zero relationships cannot carry traversal indices")]
    IndicesWithoutRelationships,

    #[error("path relationship index {0} is out of range")]
    RelationshipIndexOutOfRange(i64),

    #[error("path node index {0} is out of range")]
    NodeIndexOutOfRange(i64),
}

/// A traversal over deduplicated node and relationship lists.
///
/// `nodes` holds the distinct nodes in first-seen order, starting with the
/// traversal's first node. `relationships` holds the distinct relationships
/// in first-seen order, unbound. `indices` holds two integers per traversal
/// step: the 1-based relationship index, negated when the relationship was
/// walked against its natural direction, followed by the 0-based index of
/// the node reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<Node>,
    relationships: Vec<UnboundRelationship>,
    indices: Vec<i64>,
}

impl Path {
    /// Builds a path, validating the structure invariants.
    pub fn new(
        nodes: Vec<Node>,
        relationships: Vec<UnboundRelationship>,
        indices: Vec<i64>,
    ) -> Result<Self, PathError> {
        if nodes.is_empty() {
            return Err(PathError::NoNodes);
        }
        if indices.len() % 2 != 0 {
            return Err(PathError::OddIndexCount(indices.len()));
        }
        if relationships.is_empty() && !indices.is_empty() {
            return Err(PathError::IndicesWithoutRelationships);
        }
        for step in indices.chunks_exact(2) {
            let rel_index = step[0];
            if rel_index == 0 || rel_index.unsigned_abs() > relationships.len() as u64 {
                return Err(PathError::RelationshipIndexOutOfRange(rel_index));
            }
            let node_index = step[1];
            if node_index < 0 || node_index as u64 >= nodes.len() as u64 {
                return Err(PathError::NodeIndexOutOfRange(node_index));
            }
        }
        Ok(Self {
            nodes,
            relationships,
            indices,
        })
    }

    /// The distinct nodes in first-seen order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The distinct relationships in first-seen order, unbound.
    pub fn relationships(&self) -> &[UnboundRelationship] {
        &self.relationships
    }

    /// The traversal order array; two entries per step.
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Number of traversal steps.
    pub fn step_count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Replays the traversal, rebinding each relationship to the endpoints
    /// it connected at that step. Returns the nodes in traversal order
    /// (one more than the number of steps) and the bound relationships.
    pub fn rebind(&self) -> (Vec<Node>, Vec<Relationship>) {
        let steps = self.step_count();
        let mut nodes = Vec::with_capacity(steps + 1);
        let mut relationships = Vec::with_capacity(steps);

        let mut prev = &self.nodes[0];
        nodes.push(prev.clone());
        for step in self.indices.chunks_exact(2) {
            let rel_index = step[0];
            let rel = &self.relationships[rel_index.unsigned_abs() as usize - 1];
            let next = &self.nodes[step[1] as usize];
            let (start_id, end_id) = if rel_index > 0 {
                (prev.id, next.id)
            } else {
                (next.id, prev.id)
            };
            relationships.push(Relationship {
                id: rel.id,
                start_id,
                end_id,
                rel_type: rel.rel_type.clone(),
                properties: rel.properties.clone(),
            });
            nodes.push(next.clone());
            prev = next;
        }
        (nodes, relationships)
    }
}

/// A temporal amount split into calendar and clock components, as the wire
/// format models it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanos: i32,
}

/// A point in a coordinate reference system identified by srid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub srid: u32,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64) -> Node {
        Node {
            id,
            labels: vec!["L".to_string()],
            properties: ValueMap::new(),
        }
    }

    fn unbound(id: i64) -> UnboundRelationship {
        UnboundRelationship {
            id,
            rel_type: "T".to_string(),
            properties: ValueMap::new(),
        }
    }

    #[test]
    fn test_map_insert_replaces_existing_key() {
        let mut map = ValueMap::new();
        assert_eq!(map.insert("a", Value::Int(1)), None);
        assert_eq!(map.insert("a", Value::Int(2)), Some(Value::Int(1)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let left = ValueMap::from([("a", Value::Int(1)), ("b", Value::Int(2))]);
        let right = ValueMap::from([("b", Value::Int(2)), ("a", Value::Int(1))]);
        assert_eq!(left, right);

        let different = ValueMap::from([("a", Value::Int(1)), ("b", Value::Int(3))]);
        assert_ne!(left, different);
        let smaller = ValueMap::from([("a", Value::Int(1))]);
        assert_ne!(left, smaller);
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let map = ValueMap::from([("z", Value::Int(1)), ("a", Value::Int(2))]);
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_path_rejects_bad_structure() {
        assert_eq!(
            Path::new(vec![], vec![], vec![]),
            Err(PathError::NoNodes)
        );
        assert_eq!(
            Path::new(vec![node(1)], vec![unbound(9)], vec![1]),
            Err(PathError::OddIndexCount(1))
        );
        assert_eq!(
            Path::new(vec![node(1)], vec![], vec![1, 0]),
            Err(PathError::IndicesWithoutRelationships)
        );
        assert_eq!(
            Path::new(vec![node(1), node(2)], vec![unbound(9)], vec![0, 1]),
            Err(PathError::RelationshipIndexOutOfRange(0))
        );
        assert_eq!(
            Path::new(vec![node(1), node(2)], vec![unbound(9)], vec![2, 1]),
            Err(PathError::RelationshipIndexOutOfRange(2))
        );
        assert_eq!(
            Path::new(vec![node(1), node(2)], vec![unbound(9)], vec![1, 2]),
            Err(PathError::NodeIndexOutOfRange(2))
        );
        assert_eq!(
            Path::new(vec![node(1), node(2)], vec![unbound(9)], vec![1, -1]),
            Err(PathError::NodeIndexOutOfRange(-1))
        );
    }

    #[test]
    fn test_single_node_path() {
        let path = Path::new(vec![node(1)], vec![], vec![]).unwrap();
        assert_eq!(path.step_count(), 0);
        let (nodes, relationships) = path.rebind();
        assert_eq!(nodes.len(), 1);
        assert!(relationships.is_empty());
    }

    #[test]
    fn test_rebind_recovers_directions() {
        // (1)-[10]->(2)<-[11]-(1): second step walks 11 backwards.
        let path = Path::new(
            vec![node(1), node(2)],
            vec![unbound(10), unbound(11)],
            vec![1, 1, -2, 0],
        )
        .unwrap();

        let (nodes, relationships) = path.rebind();
        assert_eq!(
            nodes.iter().map(|n| n.id).collect::<Vec<_>>(),
            [1, 2, 1]
        );
        assert_eq!(relationships[0].id, 10);
        assert_eq!((relationships[0].start_id, relationships[0].end_id), (1, 2));
        assert_eq!(relationships[1].id, 11);
        assert_eq!((relationships[1].start_id, relationships[1].end_id), (1, 2));
    }
}
