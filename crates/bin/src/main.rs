use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keepsake=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = &cli.backend_config;
    match &cli.command {
        Commands::List(args) => commands::list::run(args, config, cli.format).await,
        Commands::Show(args) => commands::show::run(args, config, cli.format).await,
        Commands::Version(args) => commands::version::run(args, config, cli.format).await,
    }
}
