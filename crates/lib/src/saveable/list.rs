use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::warn;

use super::keys::{read_element, write_element};
use super::{ContainerKind, SaveableContainer};
use crate::codec::{Codec, CodecError};
use crate::node::Node;
use crate::schema::TypeRef;

/// An ordered list whose element type survives storage.
///
/// Dereferences to the underlying `Vec<T>`.
pub struct SaveableList<T> {
    items: Vec<T>,
    element: TypeRef,
}

impl<T: Send + 'static> SaveableList<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            element: TypeRef::of::<T>(),
        }
    }

    pub fn element_type(&self) -> TypeRef {
        self.element
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T: Send + 'static> Default for SaveableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for SaveableList<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> DerefMut for SaveableList<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl<T: Clone> Clone for SaveableList<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            element: self.element,
        }
    }
}

impl<T: PartialEq> PartialEq for SaveableList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: fmt::Debug> fmt::Debug for SaveableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: Send + 'static> FromIterator<T> for SaveableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Send + 'static> SaveableContainer for SaveableList<T> {
    fn kind(&self) -> ContainerKind {
        ContainerKind::List
    }

    fn key_type(&self) -> Option<TypeRef> {
        None
    }

    fn value_type(&self) -> TypeRef {
        self.element
    }

    fn serialize(&mut self, codec: &Codec<'_>) -> Node {
        let mut out = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter_mut().enumerate() {
            match write_element(codec, item) {
                Ok(node) => out.push(node),
                Err(e) => warn!(index, element = %self.element, error = %e, "skipping list element on write"),
            }
        }
        Node::List(out)
    }

    fn deserialize(&mut self, codec: &Codec<'_>, node: &Node) -> Result<(), CodecError> {
        let stored = node.as_list().ok_or(CodecError::TypeMismatch {
            ty: self.element.name(),
            expected: "list",
            found: node.type_name(),
        })?;
        self.items.clear();
        for (index, child) in stored.iter().enumerate() {
            match read_element::<T>(codec, child) {
                Ok(Some(item)) => self.items.push(item),
                Ok(None) => {}
                Err(e) => warn!(
                    index,
                    element = %self.element,
                    storage = %codec.storage(),
                    error = %e,
                    "skipping list element on read"
                ),
            }
        }
        Ok(())
    }
}
