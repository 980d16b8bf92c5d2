//! Storage-neutral document tree.
//!
//! Every value the codec writes becomes a [`Node`], and every repository
//! converts between [`Node`] and its physical form. Backends never see typed
//! values, only this tree, so a YAML file and a SQL row holding the same
//! document are interchangeable from the codec's point of view.
//!
//! The tree has no date variant: temporal values are written as formatted
//! text by the codec. Maps are string keyed and insertion ordered; the
//! ordered-map and keyed-map container shapes both produce [`Node::Map`].

mod convert;
mod map;
mod render;

pub use map::Map;

use std::fmt;

/// A value in the storage-neutral tree.
///
/// # Value Types
///
/// ## Leaf Values
/// - [`Node::Null`] - absent value
/// - [`Node::Bool`], [`Node::Int`], [`Node::Float`], [`Node::Text`] - scalars
///
/// ## Branch Values
/// - [`Node::Map`] - string keyed section, insertion ordered
/// - [`Node::List`] - ordered sequence
///
/// ```
/// # use keepsake::node::{Map, Node};
/// let mut section = Map::new();
/// section.insert("name", "spawn");
/// section.insert("radius", 12);
/// let node = Node::Map(section);
///
/// assert_eq!(node.get("name"), Some(&Node::from("spawn")));
/// assert_eq!(node.get("radius").and_then(Node::as_int), Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Null/absent value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
    /// Nested section
    Map(Map),
    /// Ordered collection
    List(Vec<Node>),
}

impl Node {
    /// Returns true if this is a leaf value
    pub fn is_leaf(&self) -> bool {
        !self.is_branch()
    }

    /// Returns true if this is a map or list
    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Map(_) | Node::List(_))
    }

    /// Returns true if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Name of the variant, used in mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::Text(_) => "text",
            Node::Map(_) => "map",
            Node::List(_) => "list",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Node::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats; other variants return `None`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Node::Float(f) => Some(*f),
            Node::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    /// Look up a key when this node is a map.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Canonical string form of a scalar, used for map keys.
    ///
    /// Branches and null have no key form.
    pub fn key_string(&self) -> Option<String> {
        match self {
            Node::Bool(b) => Some(b.to_string()),
            Node::Int(i) => Some(i.to_string()),
            Node::Float(f) => Some(f.to_string()),
            Node::Text(s) => Some(s.clone()),
            Node::Null | Node::Map(_) | Node::List(_) => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => write!(f, "null"),
            Node::Bool(b) => write!(f, "{b}"),
            Node::Int(i) => write!(f, "{i}"),
            Node::Float(x) => write!(f, "{x}"),
            Node::Text(s) => write!(f, "{s}"),
            Node::Map(_) | Node::List(_) => write!(f, "{}", self.render(1)),
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Int(value as i64)
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Node::Int(value as i64)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

impl From<Map> for Node {
    fn from(value: Map) -> Self {
        Node::Map(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(value)
    }
}
