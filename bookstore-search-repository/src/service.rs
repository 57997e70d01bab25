//! Search index service implementation.
//!
//! This module provides the main service for interacting with the search index.
//! Application code uses this to index and delete book documents.

use bookstore_shared::BookDocument;
use uuid::Uuid;

use crate::config::SearchIndexServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::BatchOperationSummary;

/// The main service for interacting with the search index.
///
/// This is the high-level API that application code should use. It provides input
/// validation and delegates to a `SearchIndexProvider` for actual backend operations.
///
/// # Example
///
/// ```no_run
/// use bookstore_search_repository::SearchIndexService;
/// use bookstore_search_repository::opensearch::{IndexConfig, OpenSearchProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = IndexConfig::new("book", 0);
/// let provider = Box::new(OpenSearchProvider::new("http://localhost:9200", config).await?);
/// let service = SearchIndexService::new(provider);
///
/// service.ensure_index_exists().await?;
/// service.delete(uuid::Uuid::new_v4()).await?;
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with default configuration.
    ///
    /// The default configuration includes a batch size limit of 1000 documents.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `provider` - A boxed implementation of `SearchIndexProvider` (e.g., `OpenSearchProvider`)
    /// * `config` - Custom configuration for the service
    pub fn with_config(
        provider: Box<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    fn validate_uuid(uuid: Uuid) -> Result<(), SearchIndexError> {
        if uuid.is_nil() {
            return Err(SearchIndexError::invalid_document("book uuid must not be nil"));
        }
        Ok(())
    }

    /// Reject documents that could never have come from a stored book.
    fn validate_document(document: &BookDocument) -> Result<(), SearchIndexError> {
        Self::validate_uuid(document.uuid)?;
        if document.id < 1 {
            return Err(SearchIndexError::invalid_document(format!(
                "book {} has no sequential id",
                document.uuid
            )));
        }
        if document.isbn.is_empty() {
            return Err(SearchIndexError::invalid_document(format!(
                "book {} has no isbn",
                document.uuid
            )));
        }
        Ok(())
    }

    /// Create the versioned index and its alias if they are missing.
    pub async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        self.provider.ensure_index_exists().await
    }

    /// Drop the versioned index and create it again, empty.
    ///
    /// Used before a full rebuild so documents of books that no longer
    /// exist do not survive it.
    pub async fn recreate_index(&self) -> Result<(), SearchIndexError> {
        self.provider.delete_index().await?;
        self.provider.ensure_index_exists().await
    }

    /// Index a book document, replacing any previous version.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was stored
    /// * `Err(SearchIndexError::InvalidDocument)` - If the document has a nil uuid, no id or no isbn
    /// * `Err(SearchIndexError)` - If the operation fails
    pub async fn index(&self, document: BookDocument) -> Result<(), SearchIndexError> {
        Self::validate_document(&document)?;
        self.provider.index_document(&document).await
    }

    /// Delete a book document. Deleting a missing document succeeds.
    pub async fn delete(&self, book_uuid: Uuid) -> Result<(), SearchIndexError> {
        Self::validate_uuid(book_uuid)?;
        self.provider.delete_document(book_uuid).await
    }

    /// Index multiple book documents and return a summary of successful and failed operations.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document results
    /// * `Err(SearchIndexError::BatchSizeExceeded)` - If the batch size exceeds the configured maximum
    /// * `Err(SearchIndexError::InvalidDocument)` - If any document is invalid
    ///
    /// # Note
    ///
    /// Individual operation failures are reported in the summary rather than
    /// causing the entire operation to fail.
    pub async fn batch_index(
        &self,
        documents: Vec<BookDocument>,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        self.validate_batch_size(documents.len())?;

        for document in &documents {
            Self::validate_document(document)?;
        }

        self.provider.bulk_index_documents(&documents).await
    }

    /// Delete multiple book documents and return a summary of successful and failed operations.
    pub async fn batch_delete(
        &self,
        book_uuids: Vec<Uuid>,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if book_uuids.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        self.validate_batch_size(book_uuids.len())?;

        for uuid in &book_uuids {
            Self::validate_uuid(*uuid)?;
        }

        self.provider.bulk_delete_documents(&book_uuids).await
    }
}
