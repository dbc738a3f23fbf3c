mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use tileingest::config::Config;
use tileingest::fetch::{HttpClient, HttpConfig};
use tileingest::ingest::Ingestor;
use tileingest::observability;
use tileingest::server::{self, AppState};
use tileingest::storage::StorageClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing();

    let cli = Cli::parse();

    // Resolved once; a malformed catalog stops the process here
    let config = Config::load()?;
    let http = HttpClient::new(HttpConfig::from(&config.fetch))?;
    let storage = StorageClient::from_config(&config.storage)?;
    let ingestor = Ingestor::new(http, storage);

    match cli.command {
        Commands::Run => {
            let summary = ingestor.invoke(&config.catalog).await;
            println!("{}", serde_json::to_string(&summary)?);
        }
        Commands::Server(args) => {
            let state = AppState::new(Arc::new(config.catalog), ingestor);
            server::run(args.address, state).await?
        }
    }

    Ok(())
}
