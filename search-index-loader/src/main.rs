//! Search Index Loader Main Entry Point
//!
//! Reads a JSON document file and bulk indexes it into OpenSearch, creating
//! the target index (and alias) first if needed.

use dotenv::dotenv;
use search_index_loader::documents::read_documents;
use search_index_loader::{Dependencies, LoaderConfig, LoaderError};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("search_index_loader=info,search_index_repository=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "search-index-loader",
        service_version = env!("CARGO_PKG_VERSION"),
        json = json_logs,
        "Tracing initialized"
    );
}

async fn run() -> Result<(), LoaderError> {
    let config = LoaderConfig::from_env()?;
    let deps = Dependencies::new(config).await?;
    let config = &deps.config;

    deps.service
        .create_index_if_not_exists(&config.index_name, config.index_alias.as_deref())
        .await?;

    let documents = read_documents(&config.documents_path).await?;
    let summary = deps
        .service
        .bulk_index(&config.index_name, documents)
        .await?;

    info!(
        index = %config.index_name,
        documents = summary.total,
        batches_submitted = summary.batches_submitted,
        batches_failed = summary.batches_failed,
        documents_rejected = summary.documents_rejected,
        "Load completed"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), LoaderError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting search index loader");

    match run().await {
        Ok(()) => {
            info!("Search index loader completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Search index loader failed");
            Err(e)
        }
    }
}
