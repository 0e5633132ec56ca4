//! graphpack is the binary value codec of a graph wire protocol: a packer
//! and unpacker for a self-describing, type-tagged serialization format
//! extended with graph-domain structs (nodes, relationships, paths).
//!
//! Every value starts with a marker byte identifying its type and size
//! class; multi-byte scalars are big-endian. Encoders always pick the
//! smallest size class that holds a value losslessly, and decoders widen
//! integers back to `i64`. Graph entities travel as tagged structs; paths
//! are deduplicated into distinct node and relationship lists plus a signed
//! traversal index array.
//!
//! The codec is versioned: a [`Codec`] value carries the feature tables
//! saying which struct signatures decode and which value kinds encode in
//! that protocol version. Version 1 accepts exactly the four graph structs
//! and refuses temporal, duration and point values.
//!
//! # Examples
//!
//! ```
//! use graphpack::{BytesInput, Codec, Value};
//!
//! let codec = Codec::v1();
//!
//! let mut packer = codec.new_packer(Vec::new());
//! packer.pack(&Value::from("hello"))?;
//! let bytes = packer.into_inner();
//! assert_eq!(bytes, [0x85, b'h', b'e', b'l', b'l', b'o']);
//!
//! let mut unpacker = codec.new_unpacker(BytesInput::from(bytes));
//! assert_eq!(unpacker.unpack_one()?, Some(Value::from("hello")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod buf;
mod error;
mod graph;
mod id_map;
pub mod marker;
mod parse;
mod traits;
mod value;
mod version;
mod write;

pub use crate::buf::{BytesInput, PackInput, PackOutput};
pub use crate::error::{
    PackError, PackErrorKind, PackResult, UnpackError, UnpackErrorKind, UnpackResult,
};
pub use crate::marker::PackType;
pub use crate::parse::Unpacker;
pub use crate::traits::{
    ArrayKind, Materialized, PropertyReadFailure, PropertySupplier, ValueWriter,
};
pub use crate::value::{
    Duration, Node, Path, PathError, Point, Relationship, UnboundRelationship, Value, ValueMap,
};
pub use crate::version::{Codec, signature};
pub use crate::write::Packer;
