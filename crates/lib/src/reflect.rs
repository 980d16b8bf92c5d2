//! Field reflection: which fields of a live object get persisted, and with what value.
//!
//! [`Reflector::reflect`] walks a [`CompositeShape`] against an instance and
//! returns the eligible fields in persisted order. Unset fields are given a
//! default first, and the default is written back into the instance, so a
//! second pass sees the same values and generates nothing.
//!
//! Default generation order for an unset field of declared type `T`:
//!
//! 1. `T` is the temporal type: the clock's current time
//! 2. `T` has a scalar adapter: its zero value
//! 3. `T` is a saveable container: an empty container
//! 4. `T` has a zero-argument constructor: a fresh value
//!
//! When none applies the field is omitted from the result.

use std::any::Any;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::schema::{AnyValue, CompositeShape, FieldDescriptor, Registry, Shape, TypeRef};

/// A field selected for persistence.
#[derive(Debug, Clone, Copy)]
pub struct Reflected<'s> {
    pub field: &'s FieldDescriptor,
    /// False only for an unset field marked `no_default`.
    pub present: bool,
}

impl Reflected<'_> {
    pub fn name(&self) -> &str {
        self.field.persisted_name()
    }
}

pub struct Reflector<'r> {
    registry: &'r Registry,
    clock: &'r dyn Clock,
}

impl<'r> Reflector<'r> {
    pub fn new(registry: &'r Registry, clock: &'r dyn Clock) -> Self {
        Self { registry, clock }
    }

    /// Select and default the persisted fields of `instance`.
    ///
    /// Own fields come first. The embedded ancestor's fields follow, except
    /// those whose persisted name an own field already uses.
    pub fn reflect<'s>(&self, shape: &'s CompositeShape, instance: &mut dyn Any) -> Vec<Reflected<'s>> {
        let own = shape.fields().iter();
        let inherited = shape
            .parent()
            .into_iter()
            .flat_map(|parent| parent.fields().iter())
            .filter(|f| {
                !shape
                    .fields()
                    .iter()
                    .any(|own| own.is_eligible() && own.persisted_name() == f.persisted_name())
            });

        own.chain(inherited)
            .filter(|f| f.is_eligible())
            .filter_map(|field| self.reflect_field(shape, field, instance))
            .collect()
    }

    fn reflect_field<'s>(
        &self,
        shape: &CompositeShape,
        field: &'s FieldDescriptor,
        instance: &mut dyn Any,
    ) -> Option<Reflected<'s>> {
        let present = match field.access.get(instance) {
            Ok(value) => value.is_some(),
            Err(e) => {
                warn!(owner = shape.type_name(), field = field.name(), error = %e, "cannot read field");
                return None;
            }
        };
        if present {
            return Some(Reflected { field, present });
        }
        if field.has_no_default() {
            return Some(Reflected { field, present });
        }

        let value = self.default_for(&field.declared_type())?;
        match field.access.set(instance, value) {
            Ok(()) => {
                debug!(owner = shape.type_name(), field = field.name(), "generated default");
                Some(Reflected {
                    field,
                    present: true,
                })
            }
            Err(e) => {
                warn!(owner = shape.type_name(), field = field.name(), error = %e, "cannot write default");
                None
            }
        }
    }

    /// Produce a default value for `ty`, if it has one.
    pub fn default_for(&self, ty: &TypeRef) -> Option<AnyValue> {
        let Some(descriptor) = self.registry.descriptor(ty) else {
            debug!(ty = ty.name(), "no descriptor, field omitted");
            return None;
        };
        match descriptor.shape() {
            Shape::Temporal => Some(Box::new(self.clock.now_datetime())),
            Shape::Scalar(adapter) => adapter.zero(),
            // containers construct empty, everything else through its constructor
            _ => descriptor.construct(),
        }
    }
}
