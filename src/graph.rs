//! Graph-domain struct codec: nodes, relationships and paths.
//!
//! Paths are serialized over deduplicated node and relationship lists plus
//! a traversal index array. Given the path
//! `(a {id: 42})-[r1 {id: 10}]->(b {id: 43})<-[r2 {id: 11}]-(c {id: 44})`
//! the wire carries:
//!
//! ```text
//! [a, b, c]      distinct nodes, first-seen order; a is the first node
//! [r1, r2]       distinct relationships, first-seen order, unbound
//! [1, 1, -2, 2]  per step: 1-based relationship index (sign = direction),
//!                then the 0-based index of the node reached
//! ```

use crate::buf::{PackInput, PackOutput};
use crate::error::{PackError, PackErrorKind, PackResult, UnpackResult};
use crate::parse::Unpacker;
use crate::traits::{PropertyReadFailure, PropertySupplier};
use crate::value::{Node, Path, Relationship, UnboundRelationship, Value, ValueMap};
use crate::version::{
    NODE_SIZE, PATH_SIZE, RELATIONSHIP_SIZE, StructKind, UNBOUND_RELATIONSHIP_SIZE, signature,
};
use crate::write::Packer;

const NO_SUCH_ID: i64 = -1;

impl<O: PackOutput> Packer<O> {
    pub fn pack_node(&mut self, node: &Node) -> PackResult<()> {
        self.require_encodable(StructKind::Node)?;
        self.pack_struct_header(NODE_SIZE, signature::NODE)?;
        self.pack_int(node.id)?;
        self.pack_list_header(node.labels.len())?;
        for label in &node.labels {
            self.pack_string(label)?;
        }
        node.properties.write_to(self)
    }

    pub fn pack_relationship(&mut self, relationship: &Relationship) -> PackResult<()> {
        self.require_encodable(StructKind::Relationship)?;
        self.pack_struct_header(RELATIONSHIP_SIZE, signature::RELATIONSHIP)?;
        self.pack_int(relationship.id)?;
        self.pack_int(relationship.start_id)?;
        self.pack_int(relationship.end_id)?;
        self.pack_string(&relationship.rel_type)?;
        relationship.properties.write_to(self)
    }

    pub fn pack_unbound_relationship(
        &mut self,
        relationship: &UnboundRelationship,
    ) -> PackResult<()> {
        self.require_encodable(StructKind::UnboundRelationship)?;
        self.pack_struct_header(UNBOUND_RELATIONSHIP_SIZE, signature::UNBOUND_RELATIONSHIP)?;
        self.pack_int(relationship.id)?;
        self.pack_string(&relationship.rel_type)?;
        relationship.properties.write_to(self)
    }

    /// Encodes a path from its traversal: `nodes` in visit order, one more
    /// than the `relationships` walked per step. Relationship properties
    /// are read through `supplier`; a relationship deleted within the
    /// current transaction gets an empty property map instead.
    pub fn pack_path<S: PropertySupplier>(
        &mut self,
        nodes: &[Node],
        relationships: &[Relationship],
        supplier: &S,
    ) -> PackResult<()> {
        self.require_encodable(StructKind::Path)?;
        if nodes.len() != relationships.len() + 1 {
            return Err(PackError::new(PackErrorKind::InvalidPath(format!(
                "a traversal of {} relationships must visit {} nodes, but got: {}",
                relationships.len(),
                relationships.len() + 1,
                nodes.len()
            ))));
        }

        self.pack_struct_header(PATH_SIZE, signature::PATH)?;
        self.pack_nodes_for_path(nodes)?;
        self.pack_relationships_for_path(relationships, supplier)?;

        self.pack_list_header(2 * relationships.len())?;
        if relationships.is_empty() {
            return Ok(());
        }

        let mut prev = &nodes[0];
        for (step, relationship) in relationships.iter().enumerate() {
            let index = self.relationship_indexes.get_or(relationship.id, NO_SUCH_ID);
            if prev.id == relationship.start_id {
                self.pack_int(index)?;
            } else {
                self.pack_int(-index)?;
            }
            let next = &nodes[step + 1];
            let node_index = self.node_indexes.get_or(next.id, NO_SUCH_ID);
            self.pack_int(node_index)?;
            prev = next;
        }
        Ok(())
    }

    fn pack_nodes_for_path(&mut self, nodes: &[Node]) -> PackResult<()> {
        self.node_indexes.reset(nodes.len());
        let mut distinct: Vec<&Node> = Vec::with_capacity(nodes.len());
        for node in nodes {
            let next_index = self.node_indexes.len() as u32;
            if self.node_indexes.put_if_absent(node.id, next_index) {
                distinct.push(node);
            }
        }

        self.pack_list_header(distinct.len())?;
        for node in distinct {
            self.pack_node(node)?;
        }
        Ok(())
    }

    fn pack_relationships_for_path<S: PropertySupplier>(
        &mut self,
        relationships: &[Relationship],
        supplier: &S,
    ) -> PackResult<()> {
        self.relationship_indexes.reset(relationships.len());
        let mut distinct: Vec<&Relationship> = Vec::with_capacity(relationships.len());
        for relationship in relationships {
            // Relationship indexes are one-based so the sign can carry the
            // traversal direction.
            let next_index = self.relationship_indexes.len() as u32 + 1;
            if self
                .relationship_indexes
                .put_if_absent(relationship.id, next_index)
            {
                distinct.push(relationship);
            }
        }

        self.pack_list_header(distinct.len())?;
        for relationship in distinct {
            // Serialized unbound: the endpoints are recoverable from the
            // traversal index array.
            self.pack_struct_header(UNBOUND_RELATIONSHIP_SIZE, signature::UNBOUND_RELATIONSHIP)?;
            self.pack_int(relationship.id)?;
            self.pack_string(&relationship.rel_type)?;
            match supplier.relationship_properties(relationship) {
                Ok(properties) => properties.write_to(self)?,
                Err(PropertyReadFailure::DeletedInThisTransaction) => {
                    self.pack_map_header(0)?;
                }
                Err(PropertyReadFailure::DeletedByOtherTransaction) => {
                    return Err(PackError::new(PackErrorKind::EntityReadFailure(format!(
                        "relationship {} was deleted by a concurrent transaction",
                        relationship.id
                    ))));
                }
            }
        }
        Ok(())
    }
}

impl<I: PackInput> Unpacker<I> {
    pub(crate) fn unpack_node(&mut self) -> UnpackResult<Node> {
        let id = self.expect_int("node id")?;
        let labels = self.expect_string_list("node labels")?;
        let properties = self.expect_map("node properties")?;
        Ok(Node {
            id,
            labels,
            properties,
        })
    }

    pub(crate) fn unpack_relationship(&mut self) -> UnpackResult<Relationship> {
        let id = self.expect_int("relationship id")?;
        let start_id = self.expect_int("relationship start node id")?;
        let end_id = self.expect_int("relationship end node id")?;
        let rel_type = self.expect_string("relationship type")?;
        let properties = self.expect_map("relationship properties")?;
        Ok(Relationship {
            id,
            start_id,
            end_id,
            rel_type,
            properties,
        })
    }

    pub(crate) fn unpack_unbound_relationship(&mut self) -> UnpackResult<UnboundRelationship> {
        let id = self.expect_int("relationship id")?;
        let rel_type = self.expect_string("relationship type")?;
        let properties = self.expect_map("relationship properties")?;
        Ok(UnboundRelationship {
            id,
            rel_type,
            properties,
        })
    }

    pub(crate) fn unpack_path(&mut self) -> UnpackResult<Path> {
        let nodes = match self.unpack_value()? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Node(node) => Ok(node),
                    other => Err(self.malformed(format!(
                        "Expected a node in path, but got: {}",
                        type_name(&other)
                    ))),
                })
                .collect::<UnpackResult<Vec<Node>>>()?,
            other => {
                return Err(self.malformed(format!(
                    "Expected a list of path nodes, but got: {}",
                    type_name(&other)
                )));
            }
        };
        let relationships = match self.unpack_value()? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::UnboundRelationship(relationship) => Ok(relationship),
                    other => Err(self.malformed(format!(
                        "Expected an unbound relationship in path, but got: {}",
                        type_name(&other)
                    ))),
                })
                .collect::<UnpackResult<Vec<UnboundRelationship>>>()?,
            other => {
                return Err(self.malformed(format!(
                    "Expected a list of path relationships, but got: {}",
                    type_name(&other)
                )));
            }
        };
        let indices = match self.unpack_value()? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Int(index) => Ok(index),
                    other => Err(self.malformed(format!(
                        "Expected an integer path index, but got: {}",
                        type_name(&other)
                    ))),
                })
                .collect::<UnpackResult<Vec<i64>>>()?,
            other => {
                return Err(self.malformed(format!(
                    "Expected a list of path indices, but got: {}",
                    type_name(&other)
                )));
            }
        };

        Path::new(nodes, relationships, indices).map_err(|err| self.malformed(err.to_string()))
    }

    fn expect_int(&mut self, what: &str) -> UnpackResult<i64> {
        match self.unpack_value()? {
            Value::Int(value) => Ok(value),
            other => Err(self.malformed(format!(
                "Expected an integer for {what}, but got: {}",
                type_name(&other)
            ))),
        }
    }

    fn expect_string(&mut self, what: &str) -> UnpackResult<String> {
        match self.unpack_value()? {
            Value::String(value) => Ok(value),
            other => Err(self.malformed(format!(
                "Expected a string for {what}, but got: {}",
                type_name(&other)
            ))),
        }
    }

    fn expect_map(&mut self, what: &str) -> UnpackResult<ValueMap> {
        match self.unpack_value()? {
            Value::Map(map) => Ok(map),
            other => Err(self.malformed(format!(
                "Expected a map for {what}, but got: {}",
                type_name(&other)
            ))),
        }
    }

    fn expect_string_list(&mut self, what: &str) -> UnpackResult<Vec<String>> {
        match self.unpack_value()? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(value) => Ok(value),
                    other => Err(self.malformed(format!(
                        "Expected a string for {what}, but got: {}",
                        type_name(&other)
                    ))),
                })
                .collect(),
            other => Err(self.malformed(format!(
                "Expected a list for {what}, but got: {}",
                type_name(&other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Int(_) => "Integer",
        Value::Float(_) => "Float",
        Value::Bytes(_) => "Bytes",
        Value::String(_) => "String",
        Value::List(_) => "List",
        Value::Map(_) => "Map",
        Value::Node(_) => "Node",
        Value::Relationship(_) => "Relationship",
        Value::UnboundRelationship(_) => "UnboundRelationship",
        Value::Path(_) => "Path",
        Value::Date(_) => "Date",
        Value::LocalTime(_) => "LocalTime",
        Value::Time(..) => "Time",
        Value::LocalDateTime(_) => "LocalDateTime",
        Value::DateTime(_) => "DateTime",
        Value::Duration(_) => "Duration",
        Value::Point(_) => "Point",
    }
}
