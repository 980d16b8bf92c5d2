//! Typed containers that survive a trip through an untyped backend.
//!
//! A stored list or map carries no element types, so each container holds
//! [`TypeRef`]s for its keys and values, captured when it is constructed,
//! and routes every element back through the [`Codec`] with them.
//!
//! Map keys are always stored as strings. Enumeration keys are stored by
//! symbolic name; the legacy ordinal form is still accepted on read.

mod custom;
mod enum_config;
mod hash_map;
mod keys;
mod list;
mod map;

pub use custom::CustomVariable;
pub use enum_config::EnumConfig;
pub use hash_map::SaveableHashMap;
pub use list::SaveableList;
pub use map::SaveableMap;

use crate::codec::{Codec, CodecError};
use crate::node::Node;
use crate::schema::TypeRef;

/// The three container shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    OrderedMap,
    KeyedMap,
    List,
}

/// Object-safe interface the codec uses for every container.
pub trait SaveableContainer: Send {
    fn kind(&self) -> ContainerKind;

    /// Declared key type; `None` for lists.
    fn key_type(&self) -> Option<TypeRef>;

    /// Declared value (or element) type.
    fn value_type(&self) -> TypeRef;

    /// Write every member through the codec. Members that fail to encode
    /// are logged and left out.
    fn serialize(&mut self, codec: &Codec<'_>) -> Node;

    /// Replace the content with the members read from `node`.
    ///
    /// Fails without touching the content when `node` has the wrong shape.
    /// Members that fail to decode are logged and left out. The storage
    /// kind the node came from is available as [`Codec::storage`].
    fn deserialize(&mut self, codec: &Codec<'_>, node: &Node) -> Result<(), CodecError>;
}
