//! Composite types: objects with their own persisted field set.

use std::any::Any;
use std::sync::Arc;

use super::FieldDescriptor;

/// Lifecycle points at which the codec and store call into a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    BeforeSave,
    AfterSave,
    BeforeLoad,
    AfterLoad,
}

/// A type with an explicit list of persisted fields.
///
/// Hooks default to no-ops. They run around every write and read of the
/// value, whether it is a top-level document or nested inside another one.
pub trait Composite: Any + Send {
    /// Fields in persisted order.
    fn fields() -> Vec<FieldDescriptor>;

    /// An embedded ancestor whose fields are merged after this type's own.
    fn parent() -> Option<ParentFields> {
        None
    }

    fn before_save(&mut self) {}

    fn after_save(&mut self) {}

    fn before_load(&mut self) {}

    fn after_load(&mut self) {}
}

type HookFn = Arc<dyn Fn(&mut dyn Any, Hook) + Send + Sync>;

fn run_hook<T: Composite>(value: &mut dyn Any, hook: Hook) {
    let Some(value) = value.downcast_mut::<T>() else {
        return;
    };
    match hook {
        Hook::BeforeSave => value.before_save(),
        Hook::AfterSave => value.after_save(),
        Hook::BeforeLoad => value.before_load(),
        Hook::AfterLoad => value.after_load(),
    }
}

/// The fields and hooks of an ancestor embedded by composition.
///
/// Merging is one level deep: the ancestor's own parent is not followed.
pub struct ParentFields {
    fields: Vec<FieldDescriptor>,
    hooks: HookFn,
}

impl ParentFields {
    /// Expose the `P` stored inside `D` as `D`'s ancestor.
    pub fn embed<D, P>(project: fn(&D) -> &P, project_mut: fn(&mut D) -> &mut P) -> Self
    where
        D: 'static,
        P: Composite,
    {
        let fields = P::fields()
            .into_iter()
            .map(|f| f.project::<D, P>(project, project_mut))
            .collect();
        let hooks: HookFn = Arc::new(move |value: &mut dyn Any, hook| {
            if let Some(owner) = value.downcast_mut::<D>() {
                run_hook::<P>(project_mut(owner), hook);
            }
        });
        Self { fields, hooks }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Everything the codec needs to walk one composite type.
pub struct CompositeShape {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    parent: Option<ParentFields>,
    hooks: fn(&mut dyn Any, Hook),
}

impl CompositeShape {
    pub fn of<T: Composite>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            fields: T::fields(),
            parent: T::parent(),
            hooks: run_hook::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn parent(&self) -> Option<&ParentFields> {
        self.parent.as_ref()
    }

    /// Run a hook on the embedded ancestor, then on the value itself.
    pub fn run_hook(&self, value: &mut dyn Any, hook: Hook) {
        if let Some(parent) = &self.parent {
            (parent.hooks)(value, hook);
        }
        (self.hooks)(value, hook);
    }
}
