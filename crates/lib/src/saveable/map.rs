use std::fmt;

use tracing::warn;

use super::keys::{expect_map, read_element, read_key, write_element, write_key};
use super::{ContainerKind, SaveableContainer};
use crate::codec::{Codec, CodecError};
use crate::node::{Map, Node};
use crate::schema::TypeRef;

/// An insertion-ordered map whose key and value types survive storage.
///
/// Replacing the value of an existing key keeps the key's position.
pub struct SaveableMap<K, V> {
    entries: Vec<(K, V)>,
    key: TypeRef,
    value: TypeRef,
}

impl<K, V> SaveableMap<K, V>
where
    K: PartialEq + Clone + Send + 'static,
    V: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K, V> Default for SaveableMap<K, V>
where
    K: PartialEq + Clone + Send + 'static,
    V: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for SaveableMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            key: self.key,
            value: self.value,
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for SaveableMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SaveableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for SaveableMap<K, V>
where
    K: PartialEq + Clone + Send + 'static,
    V: Send + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K, V> SaveableContainer for SaveableMap<K, V>
where
    K: PartialEq + Clone + Send + 'static,
    V: Send + 'static,
{
    fn kind(&self) -> ContainerKind {
        ContainerKind::OrderedMap
    }

    fn key_type(&self) -> Option<TypeRef> {
        Some(self.key)
    }

    fn value_type(&self) -> TypeRef {
        self.value
    }

    fn serialize(&mut self, codec: &Codec<'_>) -> Node {
        let mut section = Map::with_capacity(self.entries.len());
        for (key, value) in self.entries.iter_mut() {
            let written = write_key(codec, key).and_then(|k| Ok((k, write_element(codec, value)?)));
            match written {
                Ok((k, node)) => {
                    section.insert(k, node);
                }
                Err(e) => warn!(key = %self.key, value = %self.value, error = %e, "skipping map entry on write"),
            }
        }
        Node::Map(section)
    }

    fn deserialize(&mut self, codec: &Codec<'_>, node: &Node) -> Result<(), CodecError> {
        let stored = expect_map(node, self.key)?;
        self.entries.clear();
        for (raw_key, child) in stored.iter() {
            let read = read_key::<K>(codec, raw_key).and_then(|k| Ok((k, read_element::<V>(codec, child)?)));
            match read {
                Ok((k, Some(v))) => {
                    self.insert(k, v);
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
