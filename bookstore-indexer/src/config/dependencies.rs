//! Dependency initialization and wiring for the catalog service.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{ConnectionMode, Settings};
use crate::loader::SearchLoader;
use crate::orchestrator::Orchestrator;
use crate::processor::BookProcessor;
use crate::reindex::Reindexer;
use crate::service::CatalogService;
use crate::IndexingError;
use bookstore_repository::{
    connect, run_migrations, BookRepository, PostgresAuthorRepository, PostgresBookRepository,
    PostgresPublisherRepository, PostgresTagRepository,
};
use bookstore_search_repository::opensearch::IndexConfig;
use bookstore_search_repository::{OpenSearchProvider, SearchIndexProvider, SearchIndexService};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Shared connection pool.
    pub pool: sqlx::PgPool,
    /// Catalog access with the sync hook attached.
    pub catalog: CatalogService,
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// Full reindex job.
    pub reindexer: Reindexer,
}

impl Dependencies {
    /// Initialize all dependencies from `settings`.
    ///
    /// Connects to PostgreSQL and applies migrations, connects to OpenSearch
    /// according to the connection mode, makes sure the book index and its
    /// alias exist, then wires the catalog service to the sync pipeline.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails (OpenSearch only in fail-fast mode)
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            database_url = %settings.redacted_database_url(),
            opensearch_url = %settings.opensearch_url,
            index = %settings.index_config.versioned_index_name(),
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            sequential_id_policy = %settings.sequential_id_policy,
            "Initializing dependencies"
        );

        let pool = connect(&settings.database_url).await?;
        run_migrations(&pool).await?;

        info!("Database connection established");

        let policy = settings.sequential_id_policy;
        let publishers = PostgresPublisherRepository::new(pool.clone())
            .await?
            .with_policy(policy);
        let authors = PostgresAuthorRepository::new(pool.clone())
            .await?
            .with_policy(policy);
        let tags = PostgresTagRepository::new(pool.clone())
            .await?
            .with_policy(policy);
        let books: Arc<dyn BookRepository> = Arc::new(
            PostgresBookRepository::new(pool.clone())
                .await?
                .with_policy(policy),
        );

        // Initialize OpenSearch provider with retry logic
        let search_provider = Self::connect_to_opensearch(
            &settings.opensearch_url,
            settings.index_config.clone(),
            settings.connection_mode,
            settings.retry_interval,
        )
        .await?;

        info!("OpenSearch connection established");

        // Exits if index and alias cannot be created
        search_provider
            .ensure_index_exists()
            .await
            .map_err(|e| IndexingError::config(format!("Failed to ensure index exists: {}", e)))?;

        let search_provider: Arc<dyn SearchIndexProvider> = Arc::new(search_provider);

        let processor = BookProcessor::new(Arc::clone(&books));
        let loader = SearchLoader::new(Arc::clone(&search_provider));
        let (orchestrator, sync) = Orchestrator::new(processor, loader);

        let catalog = CatalogService::new(
            Arc::new(publishers),
            Arc::new(authors),
            Arc::new(tags),
            Arc::clone(&books),
            sync,
        )
        .with_storage(settings.storage.clone());

        let reindexer = Reindexer::new(
            books,
            SearchIndexService::new(Box::new(search_provider)),
        );

        Ok(Self {
            pool,
            catalog,
            orchestrator,
            reindexer,
        })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, IndexingError> {
        loop {
            match OpenSearchProvider::new(url, index_config.clone()).await {
                Ok(provider) => return Ok(provider),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(IndexingError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}
