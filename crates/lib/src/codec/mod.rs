//! Recursive conversion between typed values and the [`Node`] tree.
//!
//! The codec dispatches on a value's **declared** type, never on the shape of
//! the stored node, because container element types cannot be recovered from
//! the tree alone. Dispatch priority, first match wins:
//!
//! 1. unset value: [`Node::Null`]
//! 2. a custom strategy bound to the declared type
//! 3. composite: hooks around a recursive field walk
//! 4. saveable container: each element through this same dispatch
//! 5. custom variable: hooks around the value's own serializer
//! 6. natively serializable (serde) value
//! 7. temporal value: fixed-pattern text
//! 8. scalar adapter
//! 9. raw [`Node`]
//!
//! Reading mirrors this order. Per-field failures are logged and skipped;
//! a document read or write as a whole never fails because of one field.

mod errors;
pub mod temporal;

pub use errors::CodecError;

use std::any::Any;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::node::{Map, Node};
use crate::reflect::Reflector;
use crate::repository::StorageKind;
use crate::schema::{
    AnyValue, CompositeShape, ContainerShape, CustomVariableShape, ErasedStrategy, FieldDescriptor,
    Hook, NativeShape, Registry, ScalarAdapter, Shape, TypeDescriptor, TypeRef,
};

/// The resolved dispatch rule for one declared type.
enum Dispatch<'r> {
    Strategy(&'r dyn ErasedStrategy),
    Composite(&'r CompositeShape, &'r TypeDescriptor),
    Container(&'r ContainerShape, &'r TypeDescriptor),
    CustomVariable(&'r CustomVariableShape, &'r TypeDescriptor),
    Native(&'r NativeShape),
    Temporal,
    Scalar(&'r dyn ScalarAdapter),
    Raw,
}

/// Stateless converter bound to a registry for the span of one operation.
pub struct Codec<'r> {
    registry: &'r Registry,
    clock: &'r dyn Clock,
    storage: StorageKind,
}

impl<'r> Codec<'r> {
    pub fn new(registry: &'r Registry, clock: &'r dyn Clock) -> Self {
        Self {
            registry,
            clock,
            storage: StorageKind::Memory,
        }
    }

    /// Tag this codec with the backend kind it reads from, for diagnostics.
    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn reflector(&self) -> Reflector<'r> {
        Reflector::new(self.registry, self.clock)
    }

    fn dispatch(&self, ty: &TypeRef) -> Result<Dispatch<'r>, CodecError> {
        if let Some(strategy) = self.registry.strategy(ty) {
            return Ok(Dispatch::Strategy(strategy));
        }
        let descriptor = self
            .registry
            .descriptor(ty)
            .ok_or(CodecError::Unregistered { ty: ty.name() })?;
        Ok(match descriptor.shape() {
            Shape::Composite(shape) => Dispatch::Composite(shape, descriptor),
            Shape::Container(shape) => Dispatch::Container(shape, descriptor),
            Shape::CustomVariable(shape) => Dispatch::CustomVariable(shape, descriptor),
            Shape::Native(shape) => Dispatch::Native(shape),
            Shape::Temporal => Dispatch::Temporal,
            Shape::Scalar(adapter) => Dispatch::Scalar(&**adapter),
            Shape::Raw => Dispatch::Raw,
        })
    }

    /// Convert one value of declared type `ty` into a node.
    ///
    /// Takes the value mutably because composite and custom variable hooks
    /// may update it around the write.
    pub fn write_value(&self, ty: TypeRef, value: Option<&mut dyn Any>) -> Result<Node, CodecError> {
        let Some(value) = value else {
            return Ok(Node::Null);
        };
        let mismatch = || CodecError::ValueMismatch { ty: ty.name() };

        match self.dispatch(&ty)? {
            Dispatch::Strategy(strategy) => strategy.write(value).map_err(|reason| CodecError::Custom {
                ty: ty.name(),
                reason,
            }),
            Dispatch::Composite(shape, _) => {
                shape.run_hook(value, Hook::BeforeSave);
                let map = self.write_object(shape, value);
                shape.run_hook(value, Hook::AfterSave);
                Ok(Node::Map(map))
            }
            Dispatch::Container(shape, _) => {
                let container = (shape.as_mut)(value).ok_or_else(mismatch)?;
                Ok(container.serialize(self))
            }
            Dispatch::CustomVariable(shape, _) => {
                let variable = (shape.as_mut)(value).ok_or_else(mismatch)?;
                variable.before_save();
                let node = variable.serialize();
                variable.after_save();
                Ok(node)
            }
            Dispatch::Native(shape) => (shape.to_node)(value).map_err(|reason| CodecError::Native {
                ty: ty.name(),
                reason,
            }),
            Dispatch::Temporal => value
                .downcast_ref::<NaiveDateTime>()
                .map(|t| Node::Text(temporal::format(t)))
                .ok_or_else(mismatch),
            Dispatch::Scalar(adapter) => adapter.to_node(value).ok_or_else(mismatch),
            Dispatch::Raw => value.downcast_ref::<Node>().cloned().ok_or_else(mismatch),
        }
    }

    /// Reflect and write every eligible field of a composite into a section.
    ///
    /// Does not run the composite's own hooks; callers that own the value's
    /// lifecycle run them around this call.
    pub fn write_object(&self, shape: &CompositeShape, instance: &mut dyn Any) -> Map {
        let reflected = self.reflector().reflect(shape, instance);
        let mut section = Map::with_capacity(reflected.len());
        for field in reflected {
            let written = field
                .field
                .access
                .get_mut(instance)
                .map_err(CodecError::from)
                .and_then(|value| self.write_value(field.field.declared_type(), value));
            match written {
                Ok(node) => {
                    section.insert(field.name(), node);
                }
                Err(e) => warn!(
                    owner = shape.type_name(),
                    field = field.name(),
                    error = %e,
                    "skipping field on write"
                ),
            }
        }
        section
    }

    /// Build a fresh value of declared type `ty` from a node.
    ///
    /// A null node reads as `None`.
    pub fn read_value(&self, ty: TypeRef, node: &Node) -> Result<Option<AnyValue>, CodecError> {
        if node.is_null() {
            return Ok(None);
        }
        let value: AnyValue = match self.dispatch(&ty)? {
            Dispatch::Strategy(strategy) => strategy.read(node).map_err(|reason| CodecError::Custom {
                ty: ty.name(),
                reason,
            })?,
            Dispatch::Composite(_, descriptor)
            | Dispatch::Container(_, descriptor)
            | Dispatch::CustomVariable(_, descriptor) => {
                let mut fresh = descriptor
                    .construct()
                    .ok_or(CodecError::Construction { ty: ty.name() })?;
                self.read_into(ty, node, &mut *fresh)?;
                fresh
            }
            Dispatch::Native(shape) => (shape.from_node)(node).map_err(|reason| CodecError::Native {
                ty: ty.name(),
                reason,
            })?,
            Dispatch::Temporal => {
                let text = node.as_text().ok_or(CodecError::TypeMismatch {
                    ty: ty.name(),
                    expected: "text",
                    found: node.type_name(),
                })?;
                let parsed = temporal::parse(text).ok_or_else(|| CodecError::Temporal {
                    value: text.to_string(),
                })?;
                Box::new(parsed)
            }
            Dispatch::Scalar(adapter) => adapter.from_node(node).ok_or(CodecError::TypeMismatch {
                ty: ty.name(),
                expected: "scalar",
                found: node.type_name(),
            })?,
            Dispatch::Raw => Box::new(node.clone()),
        };
        Ok(Some(value))
    }

    /// Whether values of `ty` are read into an existing instance.
    ///
    /// True for composites, containers, and custom variables without a bound
    /// strategy. Those keep the instance and overwrite what the node carries.
    pub fn reads_in_place(&self, ty: &TypeRef) -> bool {
        matches!(
            self.dispatch(ty),
            Ok(Dispatch::Composite(..) | Dispatch::Container(..) | Dispatch::CustomVariable(..))
        )
    }

    /// Read a node into an existing instance of `ty`.
    pub(crate) fn read_into(&self, ty: TypeRef, node: &Node, target: &mut dyn Any) -> Result<(), CodecError> {
        let mismatch = || CodecError::ValueMismatch { ty: ty.name() };
        match self.dispatch(&ty)? {
            Dispatch::Composite(shape, _) => {
                let section = node.as_map().ok_or(CodecError::TypeMismatch {
                    ty: ty.name(),
                    expected: "map",
                    found: node.type_name(),
                })?;
                shape.run_hook(target, Hook::BeforeLoad);
                self.read_object(shape, section, target);
                shape.run_hook(target, Hook::AfterLoad);
                Ok(())
            }
            Dispatch::Container(shape, _) => {
                let container = (shape.as_mut)(target).ok_or_else(mismatch)?;
                container.deserialize(self, node)
            }
            Dispatch::CustomVariable(shape, _) => {
                let variable = (shape.as_mut)(target).ok_or_else(mismatch)?;
                variable.before_load();
                variable
                    .deserialize(node)
                    .map_err(|reason| CodecError::Custom {
                        ty: ty.name(),
                        reason,
                    })?;
                variable.after_load();
                Ok(())
            }
            _ => Err(mismatch()),
        }
    }

    /// Read a section into the eligible fields of a composite.
    ///
    /// Fields missing from the section keep the value reflection gave them:
    /// their current value, or a freshly generated default when unset.
    pub fn read_object(&self, shape: &CompositeShape, section: &Map, instance: &mut dyn Any) {
        let reflected = self.reflector().reflect(shape, instance);
        for field in reflected {
            let Some(node) = section.get(field.name()) else {
                debug!(owner = shape.type_name(), field = field.name(), "not stored, keeping default");
                continue;
            };
            if let Err(e) = self.read_field(field.field, node, instance) {
                warn!(
                    owner = shape.type_name(),
                    field = field.name(),
                    storage = %self.storage,
                    error = %e,
                    "skipping field on read"
                );
            }
        }
    }

    fn read_field(&self, field: &FieldDescriptor, node: &Node, instance: &mut dyn Any) -> Result<(), CodecError> {
        let ty = field.declared_type();
        if node.is_null() {
            return field.access.clear(instance).map_err(CodecError::from);
        }
        if self.reads_in_place(&ty)
            && let Some(target) = field.access.get_mut(instance)?
        {
            return self.read_into(ty, node, target);
        }
        if let Some(value) = self.read_value(ty, node)? {
            field.access.set(instance, value)?;
        }
        Ok(())
    }
}
