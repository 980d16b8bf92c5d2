//! CLI argument definitions for the keepsake binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// One YAML file per document under the data directory (default)
    Yaml,
    /// SQLite document table
    Sqlite,
    /// PostgreSQL document table
    Postgres,
}

/// Inspect stored keepsake configuration documents
#[derive(Parser, Debug)]
#[command(name = "keepsake")]
#[command(about = "Keepsake: inspect versioned configuration documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub backend_config: BackendConfig,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the document IDs stored under a base path
    List(ListArgs),
    /// Render a stored document
    Show(DocArgs),
    /// Print a stored document's schema version
    Version(DocArgs),
}

/// Where documents are stored
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, global = true, default_value = "yaml", env = "KEEPSAKE_BACKEND")]
    pub backend: Backend,

    /// Data directory.
    /// For YAML: root of the document tree
    /// For SQLite: stores keepsake.db unless --database-url is given
    #[arg(short = 'D', long, global = true, env = "KEEPSAKE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Database connection URL (required when backend=postgres)
    #[arg(long, global = true, env = "KEEPSAKE_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Collection holding the documents in SQL backends
    #[arg(long, global = true)]
    pub collection: Option<String>,
}

/// Arguments for the list command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Base path, relative to the store root
    #[arg(short, long, default_value = "")]
    pub path: String,
}

/// Arguments naming one document
#[derive(clap::Args, Debug)]
pub struct DocArgs {
    /// Storage path of the document, relative to the store root
    #[arg(short, long, default_value = "")]
    pub path: String,

    /// Document ID
    #[arg(long)]
    pub id: String,
}
