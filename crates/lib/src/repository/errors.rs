//! Error types for physical storage.
//!
//! These are the only fatal errors in a document operation. The store wraps
//! them with the operation kind and document ID before they reach the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing a physical unit.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// File system access failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A stored YAML file could not be parsed or a tree could not be emitted.
    #[error("YAML error at {}: {source}", path.display())]
    Yaml {
        /// File being read or written
        path: PathBuf,
        /// The underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// A stored JSON body could not be parsed or emitted.
    #[error("JSON error for document {doc_id}: {source}")]
    Json {
        /// Document whose body failed
        doc_id: String,
        /// The underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The physical unit exists but its root is not a section.
    #[error("document {doc_id} is malformed: {reason}")]
    Malformed {
        /// Document that failed
        doc_id: String,
        /// What was wrong
        reason: String,
    },

    /// A SQL statement failed.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    Sql {
        /// Context and message
        reason: String,
        /// The underlying sqlx error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl RepositoryError {
    /// The store itself could not be reached or written.
    pub fn is_io_error(&self) -> bool {
        match self {
            RepositoryError::Io { .. } => true,
            #[cfg(any(feature = "sqlite", feature = "postgres"))]
            RepositoryError::Sql { .. } => true,
            _ => false,
        }
    }

    /// The store was reachable but held data in an unreadable form.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            RepositoryError::Yaml { .. } | RepositoryError::Json { .. } | RepositoryError::Malformed { .. }
        )
    }
}

impl From<RepositoryError> for crate::Error {
    fn from(err: RepositoryError) -> Self {
        crate::Error::Repository(err)
    }
}
