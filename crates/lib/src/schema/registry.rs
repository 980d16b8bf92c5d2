//! The registry of persistable types.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use super::scalar::{EnumOf, ScalarOf};
use super::strategy::{Bound, ErasedStrategy};
use super::{
    AnyValue, Composite, CompositeShape, ContainerShape, CustomStrategy, CustomVariableShape,
    Enumeration, NativeShape, Scalar, Shape, TypeRef,
};
use crate::node::Node;
use crate::saveable::{CustomVariable, SaveableContainer, SaveableMap};

/// A registered type: its shape and, when it has one, a zero-argument constructor.
pub struct TypeDescriptor {
    ty: TypeRef,
    shape: Shape,
    construct: Option<fn() -> AnyValue>,
}

impl TypeDescriptor {
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Build a fresh value, if the type can be constructed without arguments.
    pub fn construct(&self) -> Option<AnyValue> {
        self.construct.map(|f| f())
    }
}

fn construct_default<T: Default + Send + 'static>() -> AnyValue {
    Box::new(T::default())
}

/// Type descriptors and custom strategies, keyed by declared type.
///
/// Built once during setup and then shared read-only, typically behind an
/// [`Arc`]. [`Registry::new`] pre-registers the built-in scalars,
/// `chrono::NaiveDateTime` as the temporal type, and [`Node`] as the raw type.
pub struct Registry {
    types: HashMap<TypeRef, TypeDescriptor>,
    strategies: HashMap<TypeRef, Arc<dyn ErasedStrategy>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry
            .register_scalar::<bool>()
            .register_scalar::<i8>()
            .register_scalar::<i16>()
            .register_scalar::<i32>()
            .register_scalar::<i64>()
            .register_scalar::<isize>()
            .register_scalar::<u8>()
            .register_scalar::<u16>()
            .register_scalar::<u32>()
            .register_scalar::<u64>()
            .register_scalar::<usize>()
            .register_scalar::<f32>()
            .register_scalar::<f64>()
            .register_scalar::<String>()
            .register_scalar::<char>();
        registry.register_temporal();
        registry.insert(TypeDescriptor {
            ty: TypeRef::of::<Node>(),
            shape: Shape::Raw,
            construct: Some(construct_default::<Node>),
        });
        registry
    }

    /// A registry with no types at all.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            strategies: HashMap::new(),
        }
    }

    fn insert(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        debug!(
            ty = descriptor.ty.name(),
            shape = ?descriptor.shape.kind(),
            "registered type"
        );
        self.types.insert(descriptor.ty, descriptor);
        self
    }

    /// Register `chrono::NaiveDateTime` as the temporal type.
    ///
    /// Only needed on a registry built with [`Registry::empty`].
    pub fn register_temporal(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<NaiveDateTime>(),
            shape: Shape::Temporal,
            construct: None,
        })
    }

    pub fn register_composite<T: Composite + Default>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<T>(),
            shape: Shape::Composite(CompositeShape::of::<T>()),
            construct: Some(construct_default::<T>),
        })
    }

    pub fn register_container<C: SaveableContainer + Default + 'static>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<C>(),
            shape: Shape::Container(ContainerShape::of::<C>()),
            construct: Some(construct_default::<C>),
        })
    }

    pub fn register_custom_variable<V: CustomVariable + Default>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<V>(),
            shape: Shape::CustomVariable(CustomVariableShape::of::<V>()),
            construct: Some(construct_default::<V>),
        })
    }

    /// Register a serde type stored in its native serialized form.
    ///
    /// An unset field of this type is defaulted to `T::default()`.
    pub fn register_native<T: Serialize + DeserializeOwned + Default + Send + 'static>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<T>(),
            shape: Shape::Native(NativeShape::of::<T>()),
            construct: Some(construct_default::<T>),
        })
    }

    /// Register a serde type with no zero-argument constructor.
    ///
    /// An unset field of this type is omitted rather than defaulted.
    pub fn register_native_without_default<T: Serialize + DeserializeOwned + Send + 'static>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<T>(),
            shape: Shape::Native(NativeShape::of::<T>()),
            construct: None,
        })
    }

    pub fn register_scalar<T: Scalar>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<T>(),
            shape: Shape::Scalar(Box::new(ScalarOf::<T>::new())),
            construct: None,
        })
    }

    pub fn register_enum<E: Enumeration>(&mut self) -> &mut Self {
        self.insert(TypeDescriptor {
            ty: TypeRef::of::<E>(),
            shape: Shape::Scalar(Box::new(EnumOf::<E>::new())),
            construct: None,
        })
    }

    /// Register an enumeration and the map type an
    /// [`EnumConfig`](crate::saveable::EnumConfig) over it stores.
    pub fn register_enum_config<K: Enumeration, V: Send + 'static>(&mut self) -> &mut Self {
        self.register_enum::<K>()
            .register_container::<SaveableMap<K, V>>()
    }

    /// Bind a strategy that takes over serialization of `T` entirely.
    pub fn bind_strategy<T, S>(&mut self, strategy: S) -> &mut Self
    where
        T: Send + 'static,
        S: CustomStrategy<T> + 'static,
    {
        debug!(ty = std::any::type_name::<T>(), "bound custom strategy");
        self.strategies
            .insert(TypeRef::of::<T>(), Arc::new(Bound::<T, S>::new(strategy)));
        self
    }

    pub fn descriptor(&self, ty: &TypeRef) -> Option<&TypeDescriptor> {
        self.types.get(ty)
    }

    pub fn descriptor_of<T: 'static>(&self) -> Option<&TypeDescriptor> {
        self.descriptor(&TypeRef::of::<T>())
    }

    pub(crate) fn strategy(&self, ty: &TypeRef) -> Option<&dyn ErasedStrategy> {
        self.strategies.get(ty).map(|s| s.as_ref())
    }

    pub fn has_strategy(&self, ty: &TypeRef) -> bool {
        self.strategies.contains_key(ty)
    }

    pub fn is_registered(&self, ty: &TypeRef) -> bool {
        self.types.contains_key(ty) || self.strategies.contains_key(ty)
    }
}
