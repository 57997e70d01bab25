//! Loader module for the search synchronization pipeline.
//!
//! Loads processed book documents into the search index.

use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::errors::SyncError;
use crate::processor::ProcessedEvent;
use bookstore_search_repository::{BatchOperationSummary, SearchIndexProvider};
use bookstore_shared::BookDocument;

/// Configuration for the search loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents to batch before flushing.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Loader that writes book documents into the search engine.
///
/// The loader is responsible for:
/// - Batching documents for bulk indexing
/// - Applying deletions as soon as they arrive
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
    config: LoaderConfig,
    pending_documents: Vec<BookDocument>,
    pending_deletes: Vec<Uuid>,
}

impl SearchLoader {
    /// Create a new search loader with the given provider.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(provider, LoaderConfig::default())
    }

    /// Create a new search loader with custom configuration.
    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: LoaderConfig) -> Self {
        let batch_size = config.batch_size;
        Self {
            provider,
            config,
            pending_documents: Vec::with_capacity(batch_size),
            pending_deletes: Vec::new(),
        }
    }

    /// Number of documents waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.pending_documents.len()
    }

    /// Load a batch of processed events.
    ///
    /// Documents are batched and flushed when the batch size is reached.
    #[instrument(skip(self, events), fields(event_count = events.len()))]
    pub async fn load(&mut self, events: Vec<ProcessedEvent>) -> Result<(), SyncError> {
        for event in events {
            match event {
                ProcessedEvent::Index(document) => {
                    // A later index supersedes an earlier pending one.
                    self.pending_documents.retain(|d| d.uuid != document.uuid);
                    self.pending_documents.push(document);
                }
                ProcessedEvent::Delete(uuid) => {
                    self.pending_documents.retain(|d| d.uuid != uuid);
                    self.pending_deletes.push(uuid);
                }
            }
        }

        if self.pending_documents.len() >= self.config.batch_size {
            self.flush().await?;
        }

        if !self.pending_deletes.is_empty() {
            self.process_deletes().await?;
        }

        Ok(())
    }

    /// Flush all pending documents to the search index.
    #[instrument(skip(self))]
    pub async fn flush(&mut self) -> Result<(), SyncError> {
        if self.pending_documents.is_empty() {
            return Ok(());
        }

        let documents: Vec<BookDocument> = self.pending_documents.drain(..).collect();
        let count = documents.len();

        debug!(count = count, "Flushing documents to search index");

        match self.provider.bulk_index_documents(&documents).await {
            Ok(summary) => {
                log_failures(&summary, "index");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, count = count, "Failed to bulk index documents");
                Err(SyncError::loader(format!(
                    "Failed to bulk index {} documents: {}",
                    count, e
                )))
            }
        }
    }

    /// Process pending delete operations.
    async fn process_deletes(&mut self) -> Result<(), SyncError> {
        let deletes: Vec<Uuid> = self.pending_deletes.drain(..).collect();

        match self.provider.bulk_delete_documents(&deletes).await {
            Ok(summary) => log_failures(&summary, "delete"),
            // Logged only; the next change to the book retries it.
            Err(e) => warn!(count = deletes.len(), error = %e, "Failed to delete documents"),
        }

        Ok(())
    }
}

fn log_failures(summary: &BatchOperationSummary, operation: &'static str) {
    if summary.failed == 0 {
        debug!(operation, count = summary.succeeded, "Batch applied");
        return;
    }

    warn!(
        operation,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch completed with some failures"
    );
    for result in summary.failures() {
        if let Some(ref err) = result.error {
            error!(operation, document_id = %result.document_id, error = %err, "Document failed");
        }
    }
}
