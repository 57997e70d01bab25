//! Bookstore Indexer Main Entry Point
//!
//! Applies the catalog migrations, rebuilds the book search index from the
//! stored catalog and exits.

use bookstore_indexer::{Dependencies, IndexingError, Settings};
use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "bookstore_indexer=info,bookstore_repository=info,bookstore_search_repository=info",
        )
    });

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| IndexingError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "bookstore-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| IndexingError::config(format!("Failed to initialize tracing: {}", e)))?;

        info!(
            service_name = "bookstore-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting Bookstore Indexer");

    let settings = Settings::from_env()?;
    if settings.debug {
        info!(allowed_hosts = ?settings.allowed_hosts, "Debug mode enabled");
    }

    let deps = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    // The catalog service and sync orchestrator are for embedding
    // applications; the binary only rebuilds the index.
    let Dependencies { pool, reindexer, .. } = deps;

    let result = match reindexer.rebuild().await {
        Ok(summary) => {
            info!(
                pages = summary.pages,
                indexed = summary.indexed,
                failed = summary.failed,
                "Search index rebuilt"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Search index rebuild failed");
            Err(e.into())
        }
    };

    pool.close().await;
    result
}
