//! Error types for store operations.

use std::fmt;

use thiserror::Error;

use crate::repository::RepositoryError;

/// The store operation an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Save,
    Load,
    Delete,
    LoadAll,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpKind::Save => "save",
            OpKind::Load => "load",
            OpKind::Delete => "delete",
            OpKind::LoadAll => "load all",
        })
    }
}

/// Errors surfaced by [`ConfigStore`](super::ConfigStore) operations.
///
/// Field-level codec problems, missing migrators, and validation failures
/// are never errors here; they are logged and reported as events.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The physical store failed during an operation.
    #[error("{op} of document {doc_id} failed: {source}")]
    Operation {
        /// Operation that failed
        op: OpKind,
        /// Document being processed; the base path for `LoadAll`
        doc_id: String,
        /// The underlying storage error
        #[source]
        source: RepositoryError,
    },

    /// A worker task panicked or was cancelled.
    #[error("worker task failed: {reason}")]
    WorkerFailed {
        /// Message from the runtime
        reason: String,
    },

    /// The executor closed while the task waited for a worker.
    #[error("store is shut down")]
    Closed,
}

impl StoreError {
    pub(crate) fn operation(op: OpKind, doc_id: impl Into<String>) -> impl FnOnce(RepositoryError) -> Self {
        let doc_id = doc_id.into();
        move |source| StoreError::Operation { op, doc_id, source }
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::Operation { source, .. } if source.is_io_error())
    }

    pub fn is_worker_failure(&self) -> bool {
        matches!(self, StoreError::WorkerFailed { .. } | StoreError::Closed)
    }

    pub fn op(&self) -> Option<OpKind> {
        match self {
            StoreError::Operation { op, .. } => Some(*op),
            _ => None,
        }
    }

    pub fn doc_id(&self) -> Option<&str> {
        match self {
            StoreError::Operation { doc_id, .. } => Some(doc_id),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
