//! # Bookstore Indexer
//!
//! Application layer of the bookstore catalog: persists publishers, authors,
//! tags and books in PostgreSQL and mirrors books into OpenSearch.
//!
//! ## Architecture
//!
//! Writes go through [`CatalogService`], which publishes a [`SyncEvent`]
//! after each commit. The sync pipeline follows the Processor-Loader pattern:
//!
//! 1. **Events**: Committed catalog changes on a bounded channel
//! 2. **Processor**: Resolves affected books and projects them into documents
//! 3. **Loader**: Indexes and deletes documents in OpenSearch
//! 4. **Orchestrator**: Coordinates the sync flow and shutdown
//!
//! [`Reindexer`] rebuilds the whole index from the relational store.
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`service`]: Catalog CRUD with the sync hook
//! - [`events`]: Sync events and the handle that publishes them
//! - [`processor`]: Turns events into index operations
//! - [`loader`]: Writes documents into OpenSearch
//! - [`orchestrator`]: Coordinates the sync flow
//! - [`reindex`]: Full reindex job
//! - [`errors`]: Error types for the service and the pipeline

pub mod config;
pub mod errors;
pub mod events;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod reindex;
pub mod service;

pub use config::{Dependencies, Settings};
pub use errors::{CatalogError, SyncError};
pub use events::{SyncEvent, SyncHandle};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use reindex::{ReindexSummary, Reindexer};
pub use service::CatalogService;

use bookstore_repository::CatalogRepositoryError;
use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] CatalogRepositoryError),

    /// Search synchronization error.
    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
