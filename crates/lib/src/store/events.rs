use std::fmt;

/// What happened to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Saved,
    Loaded,
    Deleted,
    /// Migrators moved the document from one schema version to another.
    Migrated { from: u32, to: u32 },
    /// The document loaded but its validator rejected it.
    ValidationFailed { message: String },
}

/// A structured notification broadcast by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEvent {
    /// Name of the host that owns the store.
    pub host: String,
    pub doc_id: String,
    pub kind: EventKind,
}

impl fmt::Display for ConfigEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.host, self.doc_id)?;
        match &self.kind {
            EventKind::Saved => f.write_str("saved"),
            EventKind::Loaded => f.write_str("loaded"),
            EventKind::Deleted => f.write_str("deleted"),
            EventKind::Migrated { from, to } => write!(f, "migrated v{from} -> v{to}"),
            EventKind::ValidationFailed { message } => write!(f, "validation failed: {message}"),
        }
    }
}
