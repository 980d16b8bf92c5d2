//! Schema versions and migrations.
//!
//! Every stored document carries its schema version at `__meta.version`
//! under its root section. A document without one is at version 1. On load
//! the store compares the stored version with the type's declared target and
//! runs the registered [`Migrator`]s to close the gap:
//!
//! ```text
//! no metadata (v1) --> stale (stored < target) --> current
//! ```
//!
//! A chain with a gap stops at the highest reachable version. That is
//! logged, not raised; the document is used at the version it reached.

use std::fmt;

use tracing::{debug, warn};

use crate::constants::{BASE_SCHEMA_VERSION, META_ROOT, META_VERSION_KEY, META_VERSION_PATH};
use crate::node::{Map, Node};

/// The schema version stored in a root section.
///
/// Absent, non-numeric, or non-positive values read as version 1. Numeric
/// text is accepted.
///
/// ```
/// # use keepsake::node::{Map, Node};
/// # use keepsake::version::read_stored_version;
/// let mut root = Map::new();
/// assert_eq!(read_stored_version(&root), 1);
///
/// root.set_path("__meta.version", Node::from("4"));
/// assert_eq!(read_stored_version(&root), 4);
/// ```
pub fn read_stored_version(root: &Map) -> u32 {
    let parsed = match root.get_path(META_VERSION_PATH) {
        Some(Node::Int(v)) => u32::try_from(*v).ok(),
        Some(Node::Float(v)) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64 => Some(*v as u32),
        Some(Node::Text(text)) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    match parsed {
        Some(version) if version >= BASE_SCHEMA_VERSION => version,
        _ => BASE_SCHEMA_VERSION,
    }
}

/// Set the schema version in a root section.
///
/// Merges into `__meta`; every other key of the root and of `__meta` is
/// kept.
pub fn set_stored_version(root: &mut Map, version: u32) {
    if !matches!(root.get(META_ROOT), Some(Node::Map(_))) {
        root.insert(META_ROOT, Map::new());
    }
    if let Some(Node::Map(meta)) = root.get_mut(META_ROOT) {
        meta.insert(META_VERSION_KEY, Node::Int(i64::from(version)));
    }
}

/// Stamp a freshly encoded root section with its schema version.
///
/// The `__meta` section of the previously stored root, if any, is carried
/// over, so metadata written by other tools survives a save. Only the
/// version leaf is replaced.
pub fn merge_stored_version(root: &mut Map, stored: Option<&Map>, version: u32) {
    if let Some(meta) = stored.and_then(|s| s.get(META_ROOT)) {
        root.insert(META_ROOT, meta.clone());
    }
    set_stored_version(root, version);
}

/// One schema transition, `from` to `to`, applied to a live document.
pub struct Migrator<D> {
    from: u32,
    to: u32,
    mutate: Box<dyn Fn(&mut D) + Send + Sync>,
}

impl<D> Migrator<D> {
    pub fn new(from: u32, to: u32, mutate: impl Fn(&mut D) + Send + Sync + 'static) -> Self {
        Self {
            from,
            to,
            mutate: Box::new(mutate),
        }
    }

    pub fn from_version(&self) -> u32 {
        self.from
    }

    pub fn to_version(&self) -> u32 {
        self.to
    }

    pub fn apply(&self, document: &mut D) {
        (self.mutate)(document)
    }
}

impl<D> fmt::Debug for Migrator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Version the document was stored at.
    pub from: u32,
    /// Version the document is at now.
    pub reached: u32,
    /// Each applied transition, in order.
    pub applied: Vec<(u32, u32)>,
}

impl MigrationOutcome {
    pub fn migrated(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// The migrators registered for one document type, ordered by `from`.
pub struct MigrationPlan<D> {
    migrators: Vec<Migrator<D>>,
}

impl<D> Default for MigrationPlan<D> {
    fn default() -> Self {
        Self {
            migrators: Vec::new(),
        }
    }
}

impl<D> fmt::Debug for MigrationPlan<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.migrators.iter()).finish()
    }
}

impl<D> MigrationPlan<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a migrator. Ones that do not move forward (`to <= from`) are
    /// dropped with a warning.
    pub fn push(&mut self, migrator: Migrator<D>) {
        if migrator.to <= migrator.from {
            warn!(from = migrator.from, to = migrator.to, "ignoring migrator that does not advance");
            return;
        }
        let index = self.migrators.partition_point(|m| m.from <= migrator.from);
        self.migrators.insert(index, migrator);
    }

    pub fn len(&self) -> usize {
        self.migrators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Migrator<D>> {
        self.migrators.iter()
    }

    /// Apply migrators to `document` from `stored` toward `target`.
    ///
    /// Each step picks the first migrator whose `from` equals the current
    /// version. Stops at `target`, or below it when no migrator continues
    /// the chain.
    pub fn run(&self, document: &mut D, stored: u32, target: u32) -> MigrationOutcome {
        let mut current = stored;
        let mut applied = Vec::new();

        while current < target {
            let Some(step) = self.migrators.iter().find(|m| m.from == current) else {
                warn!(
                    from = stored,
                    reached = current,
                    target,
                    "no migrator continues the chain, using document at reached version"
                );
                break;
            };
            debug!(from = step.from, to = step.to, "applying migrator");
            step.apply(document);
            applied.push((step.from, step.to));
            current = step.to;
        }

        MigrationOutcome {
            from: stored,
            reached: current,
            applied,
        }
    }
}
