//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use std::sync::Arc;

use async_trait::async_trait;
use bookstore_shared::BookDocument;
use uuid::Uuid;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// This trait defines the interface for all search index backend implementations. Implementations
/// are injected into `SearchIndexService` to enable dependency injection and easy testing with
/// mock implementations.
///
/// # Note on Document Writes
///
/// Book documents are always written whole. `index_document` replaces any
/// existing document with the same id, so re-indexing an unchanged book is a
/// no-op in effect.
///
/// # Index Initialization
///
/// Implementations should call `ensure_index_exists` during application startup to ensure
/// the search index and any aliases are properly configured before performing document operations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the search index and any required aliases exist, creating them if necessary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If initialization fails
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Drop the search index and every document in it.
    ///
    /// A missing index is not an error. Call `ensure_index_exists` afterwards
    /// before writing documents again.
    async fn delete_index(&self) -> Result<(), SearchIndexError>;

    /// Write a book document, creating or replacing it.
    ///
    /// # Arguments
    ///
    /// * `document` - The projected book; its UUID is the document id
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was stored
    /// * `Err(SearchIndexError)` - If the operation fails
    async fn index_document(&self, document: &BookDocument) -> Result<(), SearchIndexError>;

    /// Delete a book document from the search index.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    async fn delete_document(&self, book_uuid: Uuid) -> Result<(), SearchIndexError>;

    /// Index multiple documents and return a summary of successful and failed operations.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Contains aggregate statistics and individual results
    /// * `Err(SearchIndexError)` - If the bulk operation fails entirely
    async fn bulk_index_documents(
        &self,
        documents: &[BookDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Delete multiple documents and return a summary of successful and failed operations.
    ///
    /// Documents that don't exist are considered successful deletions.
    async fn bulk_delete_documents(
        &self,
        book_uuids: &[Uuid],
    ) -> Result<BatchOperationSummary, SearchIndexError>;
}

#[async_trait]
impl<T: SearchIndexProvider + ?Sized> SearchIndexProvider for Arc<T> {
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        (**self).ensure_index_exists().await
    }

    async fn delete_index(&self) -> Result<(), SearchIndexError> {
        (**self).delete_index().await
    }

    async fn index_document(&self, document: &BookDocument) -> Result<(), SearchIndexError> {
        (**self).index_document(document).await
    }

    async fn delete_document(&self, book_uuid: Uuid) -> Result<(), SearchIndexError> {
        (**self).delete_document(book_uuid).await
    }

    async fn bulk_index_documents(
        &self,
        documents: &[BookDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        (**self).bulk_index_documents(documents).await
    }

    async fn bulk_delete_documents(
        &self,
        book_uuids: &[Uuid],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        (**self).bulk_delete_documents(book_uuids).await
    }
}
