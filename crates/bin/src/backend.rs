//! Repository creation and utility functions.

use std::path::PathBuf;
use std::sync::Arc;

use keepsake::StoreSettings;
use keepsake::repository::{DocumentLocation, Repository, SqlDocumentRepository, YamlRepository};

use crate::cli::{Backend, BackendConfig};

/// Redact credentials from a database connection URL for safe logging
pub fn redact_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "***@<unparsable-url>".to_string()
    }
}

pub fn backend_label(config: &BackendConfig) -> &'static str {
    match config.backend {
        Backend::Yaml => "yaml",
        Backend::Sqlite => "sqlite",
        Backend::Postgres => "postgres",
    }
}

/// Location of a document, or of a base path when `doc_id` is empty.
pub fn location(path: &str, doc_id: &str) -> DocumentLocation {
    DocumentLocation::new(doc_id).with_path(path)
}

/// Store settings implied by the command line
pub fn store_settings(config: &BackendConfig) -> StoreSettings {
    let mut settings = StoreSettings::default();
    if let Some(collection) = &config.collection {
        settings.collection = collection.clone();
    }
    settings
}

/// Open the repository the configuration points at
pub async fn create_repository(config: &BackendConfig) -> Result<Arc<dyn Repository>, Box<dyn std::error::Error>> {
    let data_dir = config.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    match config.backend {
        Backend::Yaml => {
            tracing::info!("Using YAML repository at {}", data_dir.display());
            Ok(Arc::new(YamlRepository::new(data_dir)))
        }
        Backend::Sqlite => {
            let repo = match &config.database_url {
                Some(url) => {
                    tracing::info!("Using SQLite repository at {url}");
                    SqlDocumentRepository::connect_sqlite(url).await?
                }
                None => {
                    tokio::fs::create_dir_all(&data_dir).await?;
                    let db_path = data_dir.join("keepsake.db");
                    tracing::info!("Using SQLite repository at {}", db_path.display());
                    SqlDocumentRepository::open_sqlite(&db_path).await?
                }
            };
            Ok(Arc::new(repo.with_settings(&store_settings(config))))
        }
        Backend::Postgres => {
            let url = config
                .database_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --database-url or KEEPSAKE_DATABASE_URL")?;

            let display_url = redact_database_url(url);
            tracing::info!("Connecting to PostgreSQL repository at {}", display_url);

            match SqlDocumentRepository::connect_postgres(url).await {
                Ok(repo) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Arc::new(repo.with_settings(&store_settings(config))))
                }
                Err(e) => Err(format!("Failed to connect to PostgreSQL at {display_url}: {e}").into()),
            }
        }
    }
}
