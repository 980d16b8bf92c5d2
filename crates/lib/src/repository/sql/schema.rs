//! Table definitions for the SQL document store.
//!
//! The schema is portable between SQLite and PostgreSQL. [`SCHEMA_VERSION`]
//! tracks the layout of the store itself, not the schema versions of the
//! documents inside it, which live in each document's `__meta` section.

use tracing::info;

use super::{SqlDocumentRepository, SqlxResultExt};
use crate::repository::RepositoryError;

/// Current table layout version.
pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // One row per document; `_id` is the document ID, body the JSON root section
    "CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        _id TEXT NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (collection, _id)
    )",
];

pub const CREATE_INDEXES: &[&str] = &["CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)"];

/// Create missing tables and indexes.
///
/// A database written with a different table layout is refused rather than
/// read with the wrong columns.
pub async fn initialize(repo: &SqlDocumentRepository) -> Result<(), RepositoryError> {
    let pool = repo.pool();

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Schema creation failed - SQL: {statement}"))?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .sql_context("Failed to check schema version")?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .sql_context("Failed to initialize schema version")?;
            info!(version = SCHEMA_VERSION, "created document tables");
        }
        Some((SCHEMA_VERSION,)) => {}
        Some((found,)) => {
            return Err(RepositoryError::Sql {
                reason: format!("Unsupported table layout v{found}, this build reads v{SCHEMA_VERSION}"),
                source: None,
            });
        }
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Index creation failed - SQL: {statement}"))?;
    }

    Ok(())
}
