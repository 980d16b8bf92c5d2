//! Insertion-ordered string keyed section.

use super::Node;

/// Separator for dotted section paths such as `__meta.version`.
const PATH_SEPARATOR: char = '.';

/// A string keyed map that preserves insertion order.
///
/// Replacing an existing key keeps its original position, so a document
/// re-written after a load keeps the field order it was read with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: Vec<(String, Node)>,
}

impl Map {
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

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Resolve a dotted path through nested maps.
    ///
    /// ```
    /// # use keepsake::node::{Map, Node};
    /// let mut root = Map::new();
    /// root.set_path("__meta.version", Node::Int(3));
    /// assert_eq!(root.get_path("__meta.version"), Some(&Node::Int(3)));
    /// assert_eq!(root.get_path("__meta.missing"), None);
    /// ```
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a value at a dotted path, merging into existing sections.
    ///
    /// Intermediate sections are created when missing. An intermediate value
    /// that is not a map is replaced by a new section; sibling keys of every
    /// section along the path are left untouched.
    pub fn set_path(&mut self, path: &str, value: Node) {
        match path.split_once(PATH_SEPARATOR) {
            None => {
                self.insert(path, value);
            }
            Some((head, rest)) => {
                if !matches!(self.get(head), Some(Node::Map(_))) {
                    self.insert(head, Node::Map(Map::new()));
                }
                if let Some(Node::Map(section)) = self.get_mut(head) {
                    section.set_path(rest, value);
                }
            }
        }
    }
}

impl FromIterator<(String, Node)> for Map {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
