//! Show command - renders one stored document.

use keepsake::Map;

use crate::backend::{create_repository, location};
use crate::cli::{BackendConfig, DocArgs};
use crate::output::{OutputFormat, print_document};

/// Load a document's stored root, failing when nothing is stored.
pub async fn stored_root(args: &DocArgs, config: &BackendConfig) -> Result<Map, Box<dyn std::error::Error>> {
    let repo = create_repository(config).await?;
    let loaded = repo.load(&location(&args.path, &args.id)).await?;
    match loaded.root {
        Some(root) if !loaded.first_access => Ok(root),
        _ => Err(format!("No document '{}' under '{}'", args.id, repo.resolve_path(&location(&args.path, ""))).into()),
    }
}

/// Run the show command
pub async fn run(args: &DocArgs, config: &BackendConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let root = stored_root(args, config).await?;

    match format {
        OutputFormat::Human => print_document(&args.id, root),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&root.into_json())?),
    }

    Ok(())
}
