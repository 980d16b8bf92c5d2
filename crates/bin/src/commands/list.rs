//! List command - shows the documents stored under a base path.

use keepsake::constants::BASE_SCHEMA_VERSION;
use keepsake::version::read_stored_version;

use crate::backend::{backend_label, create_repository, location};
use crate::cli::{BackendConfig, ListArgs};
use crate::output::{OutputFormat, print_table};

/// Run the list command
pub async fn run(
    args: &ListArgs,
    config: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = create_repository(config).await?;
    let base = repo.resolve_path(&location(&args.path, ""));
    let ids = repo.list_documents(&base).await?;

    let mut rows = Vec::with_capacity(ids.len());
    for id in &ids {
        let loaded = repo.load(&location(&args.path, id)).await?;
        let version = loaded
            .root
            .as_ref()
            .map_or(BASE_SCHEMA_VERSION, read_stored_version);
        rows.push((id.clone(), version));
    }

    match format {
        OutputFormat::Human => {
            if rows.is_empty() {
                println!("No documents under '{base}' ({}).", backend_label(config));
                return Ok(());
            }
            let rows: Vec<Vec<String>> = rows
                .into_iter()
                .map(|(id, version)| vec![id, version.to_string()])
                .collect();
            print_table(&["ID", "VERSION"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = rows
                .into_iter()
                .map(|(id, version)| serde_json::json!({ "id": id, "version": version }))
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}
