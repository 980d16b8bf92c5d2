//! Field descriptors and type-erased field access.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use thiserror::Error;

use super::{AnyValue, TypeRef};

/// Which fields the reflector may see.
///
/// Only [`Visibility::Reflect`] fields are eligible for persistence; the
/// reflector works from an allow-list, not from all of a type's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Reflect,
    Restricted,
}

/// Failure to read or write a field through its accessor.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AccessError {
    /// The accessor was handed an object of the wrong type.
    #[error("field owner is not a {expected}")]
    OwnerMismatch {
        /// The owner type the accessor was built for
        expected: &'static str,
    },

    /// The value to assign does not have the field's type.
    #[error("value is not a {expected}")]
    ValueMismatch {
        /// The declared type of the field
        expected: &'static str,
    },

    /// A required field cannot be cleared to an absent value.
    #[error("required field cannot be unset")]
    Required,
}

/// Type-erased getter/setter pair for one field of one owner type.
pub(crate) trait FieldAccess: Send + Sync {
    /// `Ok(None)` means the field is present but unset.
    fn get<'a>(&self, owner: &'a dyn Any) -> Result<Option<&'a dyn Any>, AccessError>;

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>, AccessError>;

    fn set(&self, owner: &mut dyn Any, value: AnyValue) -> Result<(), AccessError>;

    fn clear(&self, owner: &mut dyn Any) -> Result<(), AccessError>;
}

struct Required<O, T> {
    get: fn(&O) -> &T,
    get_mut: fn(&mut O) -> &mut T,
}

impl<O: 'static, T: Send + 'static> FieldAccess for Required<O, T> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Result<Option<&'a dyn Any>, AccessError> {
        let owner = downcast_owner::<O>(owner)?;
        Ok(Some((self.get)(owner) as &dyn Any))
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>, AccessError> {
        let owner = downcast_owner_mut::<O>(owner)?;
        Ok(Some((self.get_mut)(owner) as &mut dyn Any))
    }

    fn set(&self, owner: &mut dyn Any, value: AnyValue) -> Result<(), AccessError> {
        let value = downcast_value::<T>(value)?;
        *(self.get_mut)(downcast_owner_mut::<O>(owner)?) = value;
        Ok(())
    }

    fn clear(&self, _owner: &mut dyn Any) -> Result<(), AccessError> {
        Err(AccessError::Required)
    }
}

struct Optional<O, T> {
    get: fn(&O) -> &Option<T>,
    get_mut: fn(&mut O) -> &mut Option<T>,
}

impl<O: 'static, T: Send + 'static> FieldAccess for Optional<O, T> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Result<Option<&'a dyn Any>, AccessError> {
        let owner = downcast_owner::<O>(owner)?;
        Ok((self.get)(owner).as_ref().map(|v| v as &dyn Any))
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>, AccessError> {
        let owner = downcast_owner_mut::<O>(owner)?;
        Ok((self.get_mut)(owner).as_mut().map(|v| v as &mut dyn Any))
    }

    fn set(&self, owner: &mut dyn Any, value: AnyValue) -> Result<(), AccessError> {
        let value = downcast_value::<T>(value)?;
        *(self.get_mut)(downcast_owner_mut::<O>(owner)?) = Some(value);
        Ok(())
    }

    fn clear(&self, owner: &mut dyn Any) -> Result<(), AccessError> {
        *(self.get_mut)(downcast_owner_mut::<O>(owner)?) = None;
        Ok(())
    }
}

/// Routes an ancestor's accessor through the descendant that embeds it.
struct Projected<D, P> {
    project: fn(&D) -> &P,
    project_mut: fn(&mut D) -> &mut P,
    inner: Arc<dyn FieldAccess>,
}

impl<D: 'static, P: 'static> FieldAccess for Projected<D, P> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Result<Option<&'a dyn Any>, AccessError> {
        let parent = (self.project)(downcast_owner::<D>(owner)?);
        self.inner.get(parent)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Result<Option<&'a mut dyn Any>, AccessError> {
        let parent = (self.project_mut)(downcast_owner_mut::<D>(owner)?);
        self.inner.get_mut(parent)
    }

    fn set(&self, owner: &mut dyn Any, value: AnyValue) -> Result<(), AccessError> {
        let parent = (self.project_mut)(downcast_owner_mut::<D>(owner)?);
        self.inner.set(parent, value)
    }

    fn clear(&self, owner: &mut dyn Any) -> Result<(), AccessError> {
        let parent = (self.project_mut)(downcast_owner_mut::<D>(owner)?);
        self.inner.clear(parent)
    }
}

fn downcast_owner<O: 'static>(owner: &dyn Any) -> Result<&O, AccessError> {
    owner.downcast_ref::<O>().ok_or(AccessError::OwnerMismatch {
        expected: std::any::type_name::<O>(),
    })
}

fn downcast_owner_mut<O: 'static>(owner: &mut dyn Any) -> Result<&mut O, AccessError> {
    owner.downcast_mut::<O>().ok_or(AccessError::OwnerMismatch {
        expected: std::any::type_name::<O>(),
    })
}

fn downcast_value<T: 'static>(value: AnyValue) -> Result<T, AccessError> {
    value
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| AccessError::ValueMismatch {
            expected: std::any::type_name::<T>(),
        })
}

/// One persisted field of a composite type.
///
/// Built from a pair of accessor functions, then adjusted with the builder
/// methods. `T` fields are always present; `Option<T>` fields may be unset,
/// and only unset fields receive generated defaults.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    persisted: Cow<'static, str>,
    ty: TypeRef,
    visibility: Visibility,
    persist: bool,
    no_default: bool,
    pub(crate) access: Arc<dyn FieldAccess>,
}

impl FieldDescriptor {
    /// Describe a field that always holds a value.
    pub fn required<O, T>(name: &'static str, get: fn(&O) -> &T, get_mut: fn(&mut O) -> &mut T) -> Self
    where
        O: 'static,
        T: Send + 'static,
    {
        Self::new::<T>(name, Arc::new(Required { get, get_mut }))
    }

    /// Describe an `Option<T>` field; `None` counts as unset.
    pub fn optional<O, T>(
        name: &'static str,
        get: fn(&O) -> &Option<T>,
        get_mut: fn(&mut O) -> &mut Option<T>,
    ) -> Self
    where
        O: 'static,
        T: Send + 'static,
    {
        Self::new::<T>(name, Arc::new(Optional { get, get_mut }))
    }

    fn new<T: 'static>(name: &'static str, access: Arc<dyn FieldAccess>) -> Self {
        Self {
            name,
            persisted: Cow::Borrowed(name),
            ty: TypeRef::of::<T>(),
            visibility: Visibility::Reflect,
            persist: true,
            no_default: false,
            access,
        }
    }

    /// Store the field under a different key.
    pub fn rename(mut self, persisted: impl Into<Cow<'static, str>>) -> Self {
        self.persisted = persisted.into();
        self
    }

    /// Never persist this field.
    pub fn skip(mut self) -> Self {
        self.persist = false;
        self
    }

    /// Leave this field unset instead of generating a default.
    pub fn no_default(mut self) -> Self {
        self.no_default = true;
        self
    }

    /// Hide this field from reflection.
    pub fn restricted(mut self) -> Self {
        self.visibility = Visibility::Restricted;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key the field is stored under.
    pub fn persisted_name(&self) -> &str {
        &self.persisted
    }

    pub fn declared_type(&self) -> TypeRef {
        self.ty
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_persisted(&self) -> bool {
        self.persist
    }

    pub fn has_no_default(&self) -> bool {
        self.no_default
    }

    /// Persisted and visible to reflection.
    pub fn is_eligible(&self) -> bool {
        self.persist && self.visibility == Visibility::Reflect
    }

    /// Re-target this descriptor at the ancestor embedded in `D`.
    pub(crate) fn project<D: 'static, P: 'static>(
        self,
        project: fn(&D) -> &P,
        project_mut: fn(&mut D) -> &mut P,
    ) -> Self {
        Self {
            access: Arc::new(Projected {
                project,
                project_mut,
                inner: self.access,
            }),
            ..self
        }
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("persisted", &self.persisted)
            .field("ty", &self.ty)
            .field("visibility", &self.visibility)
            .field("persist", &self.persist)
            .field("no_default", &self.no_default)
            .finish()
    }
}
