//! Explicit type descriptors for everything the codec can persist.
//!
//! Nothing is discovered at runtime. Each persisted type is registered once
//! in a [`Registry`] with a [`Shape`] that fixes how the codec dispatches on
//! it, and each composite type lists its fields as [`FieldDescriptor`]s.
//!
//! ```
//! use keepsake::schema::{Composite, FieldDescriptor, Registry};
//!
//! #[derive(Default)]
//! struct Spawn {
//!     world: String,
//!     radius: Option<i64>,
//!     cached: u32,
//! }
//!
//! impl Composite for Spawn {
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::required("world", |s: &Spawn| &s.world, |s| &mut s.world),
//!             FieldDescriptor::optional("radius", |s: &Spawn| &s.radius, |s| &mut s.radius),
//!             FieldDescriptor::required("cached", |s: &Spawn| &s.cached, |s| &mut s.cached).skip(),
//!         ]
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_composite::<Spawn>();
//! assert!(registry.descriptor_of::<Spawn>().is_some());
//! ```

mod composite;
mod field;
mod registry;
mod scalar;
mod strategy;

pub use composite::{Composite, CompositeShape, Hook, ParentFields};
pub use field::{AccessError, FieldDescriptor, Visibility};
pub use registry::{Registry, TypeDescriptor};
pub use scalar::{Enumeration, Scalar, ScalarAdapter};
pub use strategy::CustomStrategy;
pub(crate) use strategy::ErasedStrategy;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, de::DeserializeOwned};

use crate::node::Node;
use crate::saveable::{CustomVariable, SaveableContainer};

/// A type-erased value moving between the codec and a live object.
pub type AnyValue = Box<dyn Any + Send>;

/// Identity of a declared type.
///
/// Compares and hashes by [`TypeId`]; the name is carried for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full path of the type as reported by the compiler.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, generics stripped.
    ///
    /// ```
    /// # use keepsake::schema::TypeRef;
    /// struct ArenaSettings;
    /// assert_eq!(TypeRef::of::<ArenaSettings>().short_name(), "ArenaSettings");
    /// assert_eq!(TypeRef::of::<Vec<String>>().short_name(), "Vec");
    /// ```
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// How the codec treats a registered type.
///
/// The variants are listed in dispatch priority order. A bound
/// [`CustomStrategy`] outranks all of them and is tracked separately in the
/// registry.
pub enum Shape {
    /// A nested object with its own field set.
    Composite(CompositeShape),
    /// A saveable ordered map, keyed map, or list.
    Container(ContainerShape),
    /// A type that serializes itself through [`CustomVariable`].
    CustomVariable(CustomVariableShape),
    /// A serde type the backends store natively.
    Native(NativeShape),
    /// `chrono::NaiveDateTime`, stored as fixed-pattern text.
    Temporal,
    /// A scalar with a registered adapter, including enumerations.
    Scalar(Box<dyn ScalarAdapter>),
    /// A [`Node`] stored as-is.
    Raw,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Composite(_) => ShapeKind::Composite,
            Shape::Container(_) => ShapeKind::Container,
            Shape::CustomVariable(_) => ShapeKind::CustomVariable,
            Shape::Native(_) => ShapeKind::Native,
            Shape::Temporal => ShapeKind::Temporal,
            Shape::Scalar(_) => ShapeKind::Scalar,
            Shape::Raw => ShapeKind::Raw,
        }
    }
}

/// Fieldless mirror of [`Shape`] for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Composite,
    Container,
    CustomVariable,
    Native,
    Temporal,
    Scalar,
    Raw,
}

/// Downcasts from an erased value to its container interface.
pub struct ContainerShape {
    pub(crate) as_mut: fn(&mut dyn Any) -> Option<&mut dyn SaveableContainer>,
}

impl ContainerShape {
    pub(crate) fn of<C: SaveableContainer + 'static>() -> Self {
        fn cast<C: SaveableContainer + 'static>(value: &mut dyn Any) -> Option<&mut dyn SaveableContainer> {
            value
                .downcast_mut::<C>()
                .map(|c| c as &mut dyn SaveableContainer)
        }
        Self { as_mut: cast::<C> }
    }
}

/// Downcasts from an erased value to its custom variable interface.
pub struct CustomVariableShape {
    pub(crate) as_mut: fn(&mut dyn Any) -> Option<&mut dyn CustomVariable>,
}

impl CustomVariableShape {
    pub(crate) fn of<V: CustomVariable>() -> Self {
        fn cast<V: CustomVariable>(value: &mut dyn Any) -> Option<&mut dyn CustomVariable> {
            value.downcast_mut::<V>().map(|v| v as &mut dyn CustomVariable)
        }
        Self { as_mut: cast::<V> }
    }
}

/// Serde bridge for natively serializable values.
pub struct NativeShape {
    pub(crate) to_node: fn(&dyn Any) -> Result<Node, String>,
    pub(crate) from_node: fn(&Node) -> Result<AnyValue, String>,
}

impl NativeShape {
    pub(crate) fn of<T: Serialize + DeserializeOwned + Send + 'static>() -> Self {
        fn to_node<T: Serialize + 'static>(value: &dyn Any) -> Result<Node, String> {
            let value = value
                .downcast_ref::<T>()
                .ok_or_else(|| format!("value is not a {}", std::any::type_name::<T>()))?;
            serde_json::to_value(value)
                .map(Node::from)
                .map_err(|e| e.to_string())
        }
        fn from_node<T: DeserializeOwned + Send + 'static>(node: &Node) -> Result<AnyValue, String> {
            serde_json::from_value::<T>(serde_json::Value::from(node.clone()))
                .map(|v| Box::new(v) as AnyValue)
                .map_err(|e| e.to_string())
        }
        Self {
            to_node: to_node::<T>,
            from_node: from_node::<T>,
        }
    }
}
