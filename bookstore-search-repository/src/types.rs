//! Response types for search index batch operations.

use crate::errors::SearchIndexError;

/// Result of a batch operation for a single document.
///
/// This struct represents the outcome of a single operation within a batch
/// (indexing or deleting one book document). It indicates whether the
/// operation succeeded and includes error details if it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The index document id (the book UUID).
    pub document_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    pub fn succeeded(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(document_id: impl Into<String>, error: SearchIndexError) -> Self {
        Self {
            document_id: document_id.into(),
            success: false,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This allows callers to handle partial failures: a failed document does not
/// abort the rest of the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-document results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Results of the documents that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
