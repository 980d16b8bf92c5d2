//! Persisted document types and their per-type schema.
//!
//! A [`Document`] is a top-level [`Composite`] with an identity: a document
//! ID and the storage path it lives under. Two flavours exist:
//!
//! * [`StaticDocument`]: one instance per type, identified by its type name
//! * [`KeyedDocument`]: many instances per type, each with its own ID
//!
//! Everything the store needs to know about a type beyond its fields comes
//! from [`Document::schema`]: the target schema version, migrators, an
//! optional validator, and banner lines.
//!
//! # Example
//!
//! ```
//! use keepsake::document::{Document, DocumentSchema, StaticDocument};
//! use keepsake::schema::{Composite, FieldDescriptor};
//!
//! #[derive(Clone, Default)]
//! struct Lobby {
//!     motd: String,
//!     max_players: u32,
//! }
//!
//! impl Composite for Lobby {
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::required("motd", |l: &Lobby| &l.motd, |l| &mut l.motd),
//!             FieldDescriptor::required("max_players", |l: &Lobby| &l.max_players, |l| &mut l.max_players),
//!         ]
//!     }
//! }
//!
//! impl Document for Lobby {
//!     fn schema() -> DocumentSchema<Self> {
//!         DocumentSchema::new()
//!             .version(2)
//!             .migrator(1, 2, |l: &mut Lobby| l.max_players *= 2)
//!             .header(["Lobby settings"])
//!     }
//! }
//!
//! impl StaticDocument for Lobby {}
//!
//! let lobby = Lobby::default();
//! assert_eq!(lobby.document_id(), "Lobby");
//! assert_eq!(Lobby::schema().target_version(), 2);
//! ```

use std::fmt;

use crate::constants::BASE_SCHEMA_VERSION;
use crate::repository::{Banners, DocumentLocation};
use crate::schema::{Composite, TypeRef};
use crate::validation::Validator;
use crate::version::{MigrationPlan, Migrator};

/// A top-level persisted object.
pub trait Document: Composite + Clone + Sync {
    /// Stored document ID. Defaults to the type's short name.
    fn document_id(&self) -> String {
        TypeRef::of::<Self>().short_name().to_string()
    }

    /// Store the document in a folder named after its ID.
    fn use_sub_folder(&self) -> bool {
        true
    }

    /// Fixed storage path, replacing the default resolution.
    ///
    /// Keyed documents should set one (or turn sub folders off) so that
    /// every instance of the type lives under the same base path.
    fn storage_path(&self) -> Option<String> {
        None
    }

    /// Called once, when the document is created because nothing was stored yet.
    fn first_load(&mut self) {}

    fn schema() -> DocumentSchema<Self> {
        DocumentSchema::new()
    }

    fn location(&self) -> DocumentLocation {
        DocumentLocation {
            doc_id: self.document_id(),
            path_override: self.storage_path(),
            use_sub_folder: self.use_sub_folder(),
        }
    }
}

/// A document with a single instance per type.
pub trait StaticDocument: Document + Default {}

/// A document type with many instances, told apart by ID.
pub trait KeyedDocument: Document {
    /// A fresh instance with the given ID and default content.
    fn with_id(id: String) -> Self;

    /// A fresh instance with a random v4 UUID as its ID.
    fn random() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }
}

/// Versioning, validation, and banner settings for one document type.
pub struct DocumentSchema<D> {
    version: u32,
    migrations: MigrationPlan<D>,
    validator: Option<Box<dyn Validator<D>>>,
    banners: Banners,
}

impl<D> Default for DocumentSchema<D> {
    fn default() -> Self {
        Self {
            version: BASE_SCHEMA_VERSION,
            migrations: MigrationPlan::new(),
            validator: None,
            banners: Banners::default(),
        }
    }
}

impl<D> DocumentSchema<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared target schema version. Values below 1 are raised to 1.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version.max(BASE_SCHEMA_VERSION);
        self
    }

    pub fn migrator(mut self, from: u32, to: u32, mutate: impl Fn(&mut D) + Send + Sync + 'static) -> Self {
        self.migrations.push(Migrator::new(from, to, mutate));
        self
    }

    pub fn validator(mut self, validator: impl Validator<D> + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn header<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banners.header = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn footer<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banners.footer = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn target_version(&self) -> u32 {
        self.version
    }

    pub fn migrations(&self) -> &MigrationPlan<D> {
        &self.migrations
    }

    pub fn validator_ref(&self) -> Option<&dyn Validator<D>> {
        self.validator.as_deref()
    }

    pub fn banners(&self) -> &Banners {
        &self.banners
    }
}

impl<D> fmt::Debug for DocumentSchema<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSchema")
            .field("version", &self.version)
            .field("migrations", &self.migrations)
            .field("validator", &self.validator.is_some())
            .field("banners", &self.banners)
            .finish()
    }
}
