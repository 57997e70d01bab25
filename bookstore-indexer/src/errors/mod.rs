//! Error types for the catalog service and the search synchronization pipeline.

use bookstore_repository::CatalogRepositoryError;
use bookstore_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while mirroring the catalog into the search index.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Error reading books from the catalog.
    #[error("Repository error: {0}")]
    RepositoryError(#[from] CatalogRepositoryError),

    /// Error reported by the search backend.
    #[error("Search index error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl SyncError {
    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }
}

/// Errors returned by `CatalogService` operations.
///
/// Search synchronization failures never appear here; they are logged by the
/// sync pipeline instead.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Input rejected before reaching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error reported by the relational store.
    #[error(transparent)]
    Repository(#[from] CatalogRepositoryError),
}

impl CatalogError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Repository(e) if e.is_unique_violation())
    }

    pub fn is_restrict_violation(&self) -> bool {
        matches!(self, Self::Repository(e) if e.is_restrict_violation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repository(CatalogRepositoryError::NotFound { .. }))
    }
}
