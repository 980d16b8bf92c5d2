//! Reserved names used in stored documents.

/// Reserved section under a document's root holding keepsake metadata.
pub const META_ROOT: &str = "__meta";

/// Key of the schema version leaf inside [`META_ROOT`].
pub const META_VERSION_KEY: &str = "version";

/// Dotted path of the schema version leaf, relative to the document root.
pub const META_VERSION_PATH: &str = "__meta.version";

/// Schema version of a document with no metadata, and the lowest valid version.
pub const BASE_SCHEMA_VERSION: u32 = 1;

/// Collection used by the SQL document store when none is configured.
pub const DEFAULT_COLLECTION: &str = "configs";
