//! Physical storage for document trees.
//!
//! A [`Repository`] maps a [`DocumentLocation`] to one physical unit: a YAML
//! file, a SQL row, or an in-process entry. Repositories only ever see the
//! storage-neutral [`Map`] of a document's root section, so the codec reads
//! the same tree back from any of them.
//!
//! ## Available Backends
//!
//! - [`YamlRepository`]: one `<doc_id>.yml` file per document, with optional
//!   header and footer banners
//! - [`SqlDocumentRepository`] (features `sqlite` / `postgres`): one row per
//!   document holding the root section as JSON
//! - [`MemoryRepository`]: a concurrent in-process map

mod errors;
mod memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;
mod yaml;

pub use errors::RepositoryError;
pub use memory::MemoryRepository;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::SqlDocumentRepository;
pub use yaml::YamlRepository;

use std::fmt;

use async_trait::async_trait;

use crate::node::Map;

/// Which kind of physical store a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Hierarchical file store
    File,
    /// Remote document store
    Document,
    /// In-process store
    Memory,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageKind::File => "file",
            StorageKind::Document => "document",
            StorageKind::Memory => "memory",
        })
    }
}

/// Where a document lives, before a repository resolves it to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocation {
    pub doc_id: String,
    /// Fixed storage path that replaces the default resolution.
    pub path_override: Option<String>,
    /// Store the document in a folder named after its ID.
    pub use_sub_folder: bool,
}

impl DocumentLocation {
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            path_override: None,
            use_sub_folder: true,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path_override = Some(path.into());
        self
    }

    pub fn with_sub_folder(mut self, use_sub_folder: bool) -> Self {
        self.use_sub_folder = use_sub_folder;
        self
    }

    /// The override if there is one, else the ID when sub folders are on,
    /// else the store root.
    pub fn default_path(&self) -> String {
        match &self.path_override {
            Some(path) => path.clone(),
            None if self.use_sub_folder => self.doc_id.clone(),
            None => String::new(),
        }
    }
}

/// Comment lines framing a stored document.
///
/// Only stores with comment support write them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banners {
    pub header: Vec<String>,
    pub footer: Vec<String>,
}

impl Banners {
    pub fn new(header: Vec<String>, footer: Vec<String>) -> Self {
        Self { header, footer }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.footer.is_empty()
    }
}

/// Result of loading one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loaded {
    /// The document's root section: user fields plus `__meta`.
    pub root: Option<Map>,
    /// No physical unit existed before this load.
    pub first_access: bool,
}

impl Loaded {
    pub fn found(root: Map) -> Self {
        Self {
            root: Some(root),
            first_access: false,
        }
    }

    pub fn missing() -> Self {
        Self {
            root: None,
            first_access: true,
        }
    }
}

/// A physical store for document trees.
///
/// Implementations must round-trip any [`Map`] losslessly, including nested
/// maps and lists at any depth. All implementations are `Send + Sync` so a
/// single repository can be shared by every worker.
#[async_trait]
pub trait Repository: Send + Sync {
    fn kind(&self) -> StorageKind;

    /// Logical path of the document within this store.
    fn resolve_path(&self, location: &DocumentLocation) -> String {
        location.default_path()
    }

    /// Read a document's root section.
    ///
    /// A document with no physical unit is not an error; it loads as
    /// [`Loaded::missing`].
    async fn load(&self, location: &DocumentLocation) -> Result<Loaded, RepositoryError>;

    /// Replace a document's root section.
    async fn save(&self, location: &DocumentLocation, root: &Map, banners: &Banners) -> Result<(), RepositoryError>;

    /// Remove a document. Returns whether anything was removed.
    async fn delete(&self, location: &DocumentLocation) -> Result<bool, RepositoryError>;

    /// IDs of the documents stored under `base_path`, sorted.
    async fn list_documents(&self, base_path: &str) -> Result<Vec<String>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_resolution() {
        let location = DocumentLocation::new("arena");
        assert_eq!(location.default_path(), "arena");

        let flat = DocumentLocation::new("arena").with_sub_folder(false);
        assert_eq!(flat.default_path(), "");

        let fixed = DocumentLocation::new("arena")
            .with_sub_folder(false)
            .with_path("games/arenas");
        assert_eq!(fixed.default_path(), "games/arenas");
    }

    #[test]
    fn test_storage_kind_display() {
        assert_eq!(StorageKind::File.to_string(), "file");
        assert_eq!(StorageKind::Document.to_string(), "document");
    }
}
