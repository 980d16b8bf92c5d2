//!
//! Keepsake: versioned configuration persistence for plugin-style hosts.
//! This library turns annotated configuration types into persisted documents and back.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: The untyped tree every document becomes on its way to storage: leaves, lists, and ordered sections.
//! * **Schema (`schema::Registry`)**: Type descriptors for composites, scalars, enumerations, containers, custom variables, and bound custom strategies.
//! * **Codec (`codec::Codec`)**: Converts typed values to nodes and back, dispatching on each field's declared type.
//! * **Saveable containers (`saveable`)**: Lists and maps whose element types the codec knows, so they round-trip through the tree.
//! * **Repositories (`repository::Repository`)**: Pluggable physical storage. YAML files, SQL document rows, or memory.
//! * **Documents (`document::Document`)**: Top-level persisted objects with a stable ID, a schema version, migrators, and a validator.
//! * **Config store (`store::ConfigStore`)**: Save, load, delete and bulk load, run on a bounded worker pool, with document caches and events.

pub mod clock;
pub mod codec;
pub mod constants;
pub mod document;
pub mod executor;
pub mod node;
pub mod reflect;
pub mod repository;
pub mod saveable;
pub mod schema;
pub mod store;
pub mod validation;
pub mod version;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use document::{Document, DocumentSchema, KeyedDocument, StaticDocument};
pub use node::{Map, Node};
pub use schema::Registry;
pub use store::{ConfigEvent, ConfigStore, EventKind, HostContext, StoreSettings};

/// Result type used throughout the Keepsake library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Keepsake library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Structured value conversion errors from the codec module
    #[error(transparent)]
    Codec(codec::CodecError),

    /// Structured storage errors from the repository module
    #[error(transparent)]
    Repository(repository::RepositoryError),

    /// Structured operation errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Codec(_) => "codec",
            Error::Repository(_) => "repository",
            Error::Store(_) => "store",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Yaml(_) => "yaml",
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Repository(repo_err) => repo_err.is_io_error(),
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if stored or configured data could not be parsed.
    pub fn is_format_error(&self) -> bool {
        match self {
            Error::Serialize(_) | Error::Yaml(_) => true,
            Error::Repository(repo_err) => repo_err.is_format_error(),
            _ => false,
        }
    }

    /// Check if this error is a value conversion failure.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Error::Codec(_))
    }

    /// Check if a worker failed or the store was shut down.
    pub fn is_worker_failure(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_worker_failure(),
            _ => false,
        }
    }
}
