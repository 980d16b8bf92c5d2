use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use tracing::warn;

use super::keys::{expect_map, read_element, read_key, write_element, write_key};
use super::{ContainerKind, SaveableContainer};
use crate::codec::{Codec, CodecError};
use crate::node::{Map, Node};
use crate::schema::TypeRef;

/// An unordered map whose key and value types survive storage.
///
/// Entries are written sorted by their stored key so repeated saves of the
/// same content produce the same document. Dereferences to the underlying
/// `HashMap`.
pub struct SaveableHashMap<K, V> {
    inner: HashMap<K, V>,
    key: TypeRef,
    value: TypeRef,
}

impl<K, V> SaveableHashMap<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    pub fn new() -> Self {
        Self::from_map(HashMap::new())
    }

    pub fn from_map(inner: HashMap<K, V>) -> Self {
        Self {
            inner,
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        }
    }

    pub fn into_inner(self) -> HashMap<K, V> {
        self.inner
    }
}

impl<K, V> Default for SaveableHashMap<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Deref for SaveableHashMap<K, V> {
    type Target = HashMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<K, V> DerefMut for SaveableHashMap<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<K: Clone, V: Clone> Clone for SaveableHashMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            key: self.key,
            value: self.value,
        }
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for SaveableHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SaveableHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<K, V> FromIterator<(K, V)> for SaveableHashMap<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl<K, V> SaveableContainer for SaveableHashMap<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    fn kind(&self) -> ContainerKind {
        ContainerKind::KeyedMap
    }

    fn key_type(&self) -> Option<TypeRef> {
        Some(self.key)
    }

    fn value_type(&self) -> TypeRef {
        self.value
    }

    fn serialize(&mut self, codec: &Codec<'_>) -> Node {
        let mut written = Vec::with_capacity(self.inner.len());
        for (key, value) in self.inner.iter_mut() {
            match write_key(codec, key).and_then(|k| Ok((k, write_element(codec, value)?))) {
                Ok(entry) => written.push(entry),
                Err(e) => warn!(key = %self.key, value = %self.value, error = %e, "skipping map entry on write"),
            }
        }
        written.sort_by(|a, b| a.0.cmp(&b.0));
        Node::Map(written.into_iter().collect::<Map>())
    }

    fn deserialize(&mut self, codec: &Codec<'_>, node: &Node) -> Result<(), CodecError> {
        let stored = expect_map(node, self.key)?;
        self.inner.clear();
        for (raw_key, child) in stored.iter() {
            match read_key::<K>(codec, raw_key).and_then(|k| Ok((k, read_element::<V>(codec, child)?))) {
                Ok((k, Some(v))) => {
                    self.inner.insert(k, v);
                }
                Ok((_, None)) => {}
                Err(e) => warn!(
                    key = raw_key,
                    storage = %codec.storage(),
                    error = %e,
                    "skipping map entry on read"
                ),
            }
        }
        Ok(())
    }
}
