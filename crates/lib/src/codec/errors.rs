//! Error types for value encoding and decoding.
//!
//! None of these are fatal to a document operation. The codec logs them per
//! field and carries on with the field's previous value.

use thiserror::Error;

use crate::schema::AccessError;

/// Errors that can occur while converting one value.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// The declared type has neither a descriptor nor a strategy.
    #[error("type {ty} is not registered")]
    Unregistered {
        /// Name of the declared type
        ty: &'static str,
    },

    /// The stored node does not have the shape the declared type needs.
    #[error("expected {expected} for {ty}, found {found}")]
    TypeMismatch {
        /// Name of the declared type
        ty: &'static str,
        /// Node shape the type reads from
        expected: &'static str,
        /// Node shape actually stored
        found: &'static str,
    },

    /// The live value is not an instance of its declared type.
    #[error("live value is not a {ty}")]
    ValueMismatch {
        /// Name of the declared type
        ty: &'static str,
    },

    /// No zero-argument constructor for a type that needs one to be read.
    #[error("cannot construct {ty}")]
    Construction {
        /// Name of the type
        ty: &'static str,
    },

    /// Reading or writing the field through its accessor failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// A custom strategy or custom variable rejected the value.
    #[error("custom serialization of {ty} failed: {reason}")]
    Custom {
        /// Name of the type
        ty: &'static str,
        /// Message from the strategy
        reason: String,
    },

    /// A natively serialized value could not be converted.
    #[error("native conversion of {ty} failed: {reason}")]
    Native {
        /// Name of the type
        ty: &'static str,
        /// Message from serde
        reason: String,
    },

    /// Stored text is not in the temporal format.
    #[error("invalid temporal value {value:?}")]
    Temporal {
        /// The stored text
        value: String,
    },

    /// A container key did not encode to a scalar.
    #[error("map key of type {ty} has no scalar form")]
    KeyNotScalar {
        /// Name of the key type
        ty: &'static str,
    },
}

impl CodecError {
    /// Stored data does not fit the declared type.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            CodecError::TypeMismatch { .. } | CodecError::Temporal { .. } | CodecError::KeyNotScalar { .. }
        )
    }

    /// The type is missing from the registry or cannot be built.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            CodecError::Unregistered { .. } | CodecError::Construction { .. }
        )
    }

    pub fn is_access_error(&self) -> bool {
        matches!(self, CodecError::Access(_) | CodecError::ValueMismatch { .. })
    }
}

impl From<CodecError> for crate::Error {
    fn from(err: CodecError) -> Self {
        crate::Error::Codec(err)
    }
}
