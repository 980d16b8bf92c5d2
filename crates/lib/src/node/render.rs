//! Human-readable rendering used by debug display.

use super::Node;

const INDENT: &str = "  ";

impl Node {
    /// Render this node as an indented, YAML-like block.
    ///
    /// `depth` is the nesting level of the node's children; sections open
    /// and close one level shallower. Leaves render inline.
    ///
    /// ```
    /// # use keepsake::node::{Map, Node};
    /// let mut map = Map::new();
    /// map.insert("radius", 4);
    /// map.insert("tags", Node::List(vec!["a".into()]));
    /// assert_eq!(
    ///     Node::Map(map).render(1),
    ///     "{\n  radius: 4\n  tags: [\n    a\n  ]\n}"
    /// );
    /// ```
    pub fn render(&self, depth: usize) -> String {
        let mut out = String::new();
        self.render_into(&mut out, depth);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let close = INDENT.repeat(depth.saturating_sub(1));
        let pad = INDENT.repeat(depth);
        match self {
            Node::Map(map) if map.is_empty() => out.push_str("{}"),
            Node::List(items) if items.is_empty() => out.push_str("[]"),
            Node::Map(map) => {
                out.push('{');
                for (key, value) in map.iter() {
                    out.push('\n');
                    out.push_str(&pad);
                    out.push_str(key);
                    out.push_str(": ");
                    value.render_into(out, depth + 1);
                }
                out.push('\n');
                out.push_str(&close);
                out.push('}');
            }
            Node::List(items) => {
                out.push('[');
                for item in items {
                    out.push('\n');
                    out.push_str(&pad);
                    item.render_into(out, depth + 1);
                }
                out.push('\n');
                out.push_str(&close);
                out.push(']');
            }
            leaf => out.push_str(&leaf.to_string()),
        }
    }
}
