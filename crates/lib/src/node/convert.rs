//! Conversions between [`Node`] and the physical value models of each backend.
//!
//! The YAML store goes through [`serde_yaml::Value`] and the document store
//! through [`serde_json::Value`]. Both directions preserve map order and
//! nesting depth; map keys are normalised to strings on the way in.
//!
//! JSON has no form for non-finite floats, so both backends store them as
//! the text `inf`, `-inf` or `NaN`, which the float adapters read back.

use super::{Map, Node};

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Int(i),
                None => n.as_f64().map(Node::Float).unwrap_or(Node::Null),
            },
            Value::String(s) => Node::Text(s),
            Value::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Object(object) => Node::Map(
                object
                    .into_iter()
                    .map(|(k, v)| (k, Node::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for serde_json::Value {
    fn from(node: Node) -> Self {
        use serde_json::Value;
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(b),
            Node::Int(i) => Value::from(i),
            Node::Float(f) => match serde_json::Number::from_f64(f) {
                Some(n) => Value::Number(n),
                None => Value::String(non_finite_text(f)),
            },
            Node::Text(s) => Value::String(s),
            Node::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Map(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Int(i),
                None => n.as_f64().map(Node::Float).unwrap_or(Node::Null),
            },
            Value::String(s) => Node::Text(s),
            Value::Sequence(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Mapping(mapping) => Node::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (yaml_key(k), Node::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

impl From<Node> for serde_yaml::Value {
    fn from(node: Node) -> Self {
        use serde_yaml::Value;
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(b),
            Node::Int(i) => Value::Number(i.into()),
            Node::Float(f) if !f.is_finite() => Value::String(non_finite_text(f)),
            Node::Float(f) => Value::Number(f.into()),
            Node::Text(s) => Value::String(s),
            Node::List(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Node::Map(map) => {
                let mut mapping = serde_yaml::Mapping::with_capacity(map.len());
                for (k, v) in map {
                    mapping.insert(Value::String(k), Value::from(v));
                }
                Value::Mapping(mapping)
            }
        }
    }
}

fn non_finite_text(f: f64) -> String {
    f.to_string()
}

/// Render a YAML mapping key in its canonical string form.
///
/// Hand-edited files may carry unquoted numeric or boolean keys; those become
/// the same string the codec would have written for that scalar.
fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match key {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::from("null"),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl Map {
    /// Convert into a JSON object value.
    pub fn into_json(self) -> serde_json::Value {
        serde_json::Value::from(Node::Map(self))
    }
}
