//! Element and key conversion shared by the containers.

use crate::codec::{Codec, CodecError};
use crate::node::Node;
use crate::schema::TypeRef;

pub(crate) fn write_element<T: Send + 'static>(codec: &Codec<'_>, value: &mut T) -> Result<Node, CodecError> {
    codec.write_value(TypeRef::of::<T>(), Some(value))
}

/// `Ok(None)` for a stored null.
pub(crate) fn read_element<T: Send + 'static>(codec: &Codec<'_>, node: &Node) -> Result<Option<T>, CodecError> {
    let ty = TypeRef::of::<T>();
    match codec.read_value(ty, node)? {
        Some(value) => value
            .downcast::<T>()
            .map(|v| Some(*v))
            .map_err(|_| CodecError::ValueMismatch { ty: ty.name() }),
        None => Ok(None),
    }
}

/// Encode a key to its string form.
pub(crate) fn write_key<K: Clone + Send + 'static>(codec: &Codec<'_>, key: &K) -> Result<String, CodecError> {
    let ty = TypeRef::of::<K>();
    let mut owned = key.clone();
    codec
        .write_value(ty, Some(&mut owned))?
        .key_string()
        .ok_or(CodecError::KeyNotScalar { ty: ty.name() })
}

pub(crate) fn read_key<K: Send + 'static>(codec: &Codec<'_>, key: &str) -> Result<K, CodecError> {
    read_element::<K>(codec, &Node::Text(key.to_string()))?.ok_or(CodecError::KeyNotScalar {
        ty: std::any::type_name::<K>(),
    })
}

pub(crate) fn expect_map<'n>(node: &'n Node, ty: TypeRef) -> Result<&'n crate::node::Map, CodecError> {
    node.as_map().ok_or(CodecError::TypeMismatch {
        ty: ty.name(),
        expected: "map",
        found: node.type_name(),
    })
}
