//! Version command - prints a stored document's schema version.

use keepsake::version::read_stored_version;

use crate::cli::{BackendConfig, DocArgs};
use crate::commands::show::stored_root;
use crate::output::OutputFormat;

/// Run the version command
pub async fn run(args: &DocArgs, config: &BackendConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let root = stored_root(args, config).await?;
    let version = read_stored_version(&root);

    match format {
        OutputFormat::Human => println!("{version}"),
        OutputFormat::Json => {
            let value = serde_json::json!({ "id": args.id, "version": version });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
