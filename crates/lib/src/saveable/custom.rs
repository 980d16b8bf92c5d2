use crate::node::Node;

/// A value that converts itself to and from a [`Node`].
///
/// For types whose stored form does not follow their field layout. The
/// hooks run around each conversion, the same way composite hooks do.
///
/// ```
/// use keepsake::node::Node;
/// use keepsake::saveable::CustomVariable;
///
/// #[derive(Default)]
/// struct Position {
///     x: i64,
///     z: i64,
/// }
///
/// impl CustomVariable for Position {
///     fn serialize(&self) -> Node {
///         Node::from(format!("{},{}", self.x, self.z))
///     }
///
///     fn deserialize(&mut self, node: &Node) -> Result<(), String> {
///         let text = node.as_text().ok_or("expected text")?;
///         let (x, z) = text.split_once(',').ok_or("expected x,z")?;
///         self.x = x.parse().map_err(|_| "bad x")?;
///         self.z = z.parse().map_err(|_| "bad z")?;
///         Ok(())
///     }
/// }
/// ```
pub trait CustomVariable: Send + 'static {
    fn before_save(&mut self) {}

    fn serialize(&self) -> Node;

    fn after_save(&mut self) {}

    fn before_load(&mut self) {}

    fn deserialize(&mut self, node: &Node) -> Result<(), String>;

    fn after_load(&mut self) {}
}
