//! Custom serialization strategies bound to a declared type.

use std::any::Any;
use std::marker::PhantomData;

use super::AnyValue;
use crate::node::Node;

/// A serialize/deserialize pair that replaces all built-in dispatch for `T`.
///
/// ```
/// use keepsake::node::Node;
/// use keepsake::schema::CustomStrategy;
///
/// struct Celsius(f64);
///
/// struct AsText;
///
/// impl CustomStrategy<Celsius> for AsText {
///     fn serialize(&self, value: &Celsius) -> Node {
///         Node::from(format!("{}C", value.0))
///     }
///
///     fn deserialize(&self, node: &Node) -> Result<Celsius, String> {
///         let text = node.as_text().ok_or("expected text")?;
///         let number = text.trim_end_matches('C');
///         number.parse().map(Celsius).map_err(|e| format!("{e}"))
///     }
/// }
/// ```
pub trait CustomStrategy<T>: Send + Sync {
    fn serialize(&self, value: &T) -> Node;

    fn deserialize(&self, node: &Node) -> Result<T, String>;
}

pub(crate) trait ErasedStrategy: Send + Sync {
    fn write(&self, value: &dyn Any) -> Result<Node, String>;

    fn read(&self, node: &Node) -> Result<AnyValue, String>;
}

pub(crate) struct Bound<T, S> {
    strategy: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> Bound<T, S> {
    pub(crate) fn new(strategy: S) -> Self {
        Self {
            strategy,
            _marker: PhantomData,
        }
    }
}

impl<T, S> ErasedStrategy for Bound<T, S>
where
    T: Send + 'static,
    S: CustomStrategy<T>,
{
    fn write(&self, value: &dyn Any) -> Result<Node, String> {
        value
            .downcast_ref::<T>()
            .map(|v| self.strategy.serialize(v))
            .ok_or_else(|| format!("value is not a {}", std::any::type_name::<T>()))
    }

    fn read(&self, node: &Node) -> Result<AnyValue, String> {
        self.strategy
            .deserialize(node)
            .map(|v| Box::new(v) as AnyValue)
    }
}
