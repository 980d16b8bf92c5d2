//! Scalar adapters and enumerations.
//!
//! Adapters read leniently: a numeric field stored as text (the form every
//! map key takes) still reads back, so scalar keys and scalar values share
//! one conversion path.

use std::any::Any;
use std::marker::PhantomData;

use super::AnyValue;
use crate::node::Node;

/// A value with a zero default and a direct [`Node`] form.
pub trait Scalar: Sized + Send + 'static {
    fn zero() -> Self;

    fn to_node(&self) -> Node;

    /// `None` when the node cannot be read as this type.
    fn from_node(node: &Node) -> Option<Self>;
}

/// Type-erased view of a registered scalar.
pub trait ScalarAdapter: Send + Sync {
    /// Zero value, when the type has one.
    fn zero(&self) -> Option<AnyValue>;

    fn to_node(&self, value: &dyn Any) -> Option<Node>;

    fn from_node(&self, node: &Node) -> Option<AnyValue>;
}

pub(crate) struct ScalarOf<T>(PhantomData<fn() -> T>);

impl<T> ScalarOf<T> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Scalar> ScalarAdapter for ScalarOf<T> {
    fn zero(&self) -> Option<AnyValue> {
        Some(Box::new(T::zero()))
    }

    fn to_node(&self, value: &dyn Any) -> Option<Node> {
        value.downcast_ref::<T>().map(T::to_node)
    }

    fn from_node(&self, node: &Node) -> Option<AnyValue> {
        T::from_node(node).map(|v| Box::new(v) as AnyValue)
    }
}

/// A fieldless enum persisted by its symbolic name.
///
/// Documents written before names were used stored the variant's ordinal;
/// both forms read back.
///
/// ```
/// use keepsake::schema::Enumeration;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Direction { North, South }
///
/// impl Enumeration for Direction {
///     fn variants() -> &'static [Self] {
///         &[Direction::North, Direction::South]
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             Direction::North => "NORTH",
///             Direction::South => "SOUTH",
///         }
///     }
/// }
///
/// assert_eq!(Direction::from_name("SOUTH"), Some(Direction::South));
/// assert_eq!(Direction::from_ordinal(0), Some(Direction::North));
/// ```
pub trait Enumeration: Copy + Eq + std::hash::Hash + Send + Sync + 'static {
    fn variants() -> &'static [Self];

    fn name(&self) -> &'static str;

    fn ordinal(&self) -> usize {
        Self::variants()
            .iter()
            .position(|v| v == self)
            .unwrap_or_default()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::variants().iter().copied().find(|v| v.name() == name)
    }

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::variants().get(ordinal).copied()
    }
}

pub(crate) struct EnumOf<E>(PhantomData<fn() -> E>);

impl<E> EnumOf<E> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Enumeration> EnumOf<E> {
    fn read(node: &Node) -> Option<E> {
        match node {
            Node::Text(text) => E::from_name(text).or_else(|| {
                text.parse::<usize>().ok().and_then(E::from_ordinal)
            }),
            Node::Int(ordinal) => usize::try_from(*ordinal).ok().and_then(E::from_ordinal),
            _ => None,
        }
    }
}

impl<E: Enumeration> ScalarAdapter for EnumOf<E> {
    fn zero(&self) -> Option<AnyValue> {
        E::variants().first().map(|v| Box::new(*v) as AnyValue)
    }

    fn to_node(&self, value: &dyn Any) -> Option<Node> {
        value.downcast_ref::<E>().map(|v| Node::from(v.name()))
    }

    fn from_node(&self, node: &Node) -> Option<AnyValue> {
        Self::read(node).map(|v| Box::new(v) as AnyValue)
    }
}

impl Scalar for bool {
    fn zero() -> Self {
        false
    }

    fn to_node(&self) -> Node {
        Node::Bool(*self)
    }

    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Bool(b) => Some(*b),
            Node::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                fn zero() -> Self {
                    0
                }

                fn to_node(&self) -> Node {
                    // Values beyond i64 cannot be represented as an integer node.
                    i64::try_from(*self)
                        .map(Node::Int)
                        .unwrap_or_else(|_| Node::Text(self.to_string()))
                }

                fn from_node(node: &Node) -> Option<Self> {
                    match node {
                        Node::Int(i) => <$ty>::try_from(*i).ok(),
                        Node::Text(s) => s.trim().parse().ok(),
                        Node::Float(f) if f.fract() == 0.0 => <$ty>::try_from(*f as i64).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Scalar for f64 {
    fn zero() -> Self {
        0.0
    }

    fn to_node(&self) -> Node {
        if self.is_finite() {
            Node::Float(*self)
        } else {
            Node::Text(self.to_string())
        }
    }

    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Text(s) => s.trim().parse().ok(),
            other => other.as_float(),
        }
    }
}

impl Scalar for f32 {
    fn zero() -> Self {
        0.0
    }

    fn to_node(&self) -> Node {
        (*self as f64).to_node()
    }

    fn from_node(node: &Node) -> Option<Self> {
        f64::from_node(node).map(|f| f as f32)
    }
}

impl Scalar for String {
    fn zero() -> Self {
        String::new()
    }

    fn to_node(&self) -> Node {
        Node::Text(self.clone())
    }

    fn from_node(node: &Node) -> Option<Self> {
        node.key_string()
    }
}

impl Scalar for char {
    fn zero() -> Self {
        '\0'
    }

    fn to_node(&self) -> Node {
        Node::Text(self.to_string())
    }

    fn from_node(node: &Node) -> Option<Self> {
        let text = node.as_text()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}
