//! Failures of the book search index.

use thiserror::Error;

/// Errors returned by `SearchIndexProvider` implementations and
/// `SearchIndexService`.
///
/// Document failures carry the document id (the book UUID) so they can be
/// reported per book in a `BatchOperationSummary`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchIndexError {
    /// Rejected before reaching the cluster.
    #[error("Invalid book document: {0}")]
    InvalidDocument(String),

    /// The cluster could not be reached.
    #[error("Search cluster unavailable: {0}")]
    Unavailable(String),

    /// Creating, aliasing or dropping the versioned index failed.
    #[error("Index {index} setup failed: {reason}")]
    IndexSetup { index: String, reason: String },

    #[error("Failed to index book {document_id}: {reason}")]
    Write { document_id: String, reason: String },

    #[error("Failed to delete book {document_id}: {reason}")]
    Delete { document_id: String, reason: String },

    #[error("Batch of {provided} books exceeds the limit of {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl SearchIndexError {
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn index_setup(index: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IndexSetup {
            index: index.into(),
            reason: reason.into(),
        }
    }

    pub fn write(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Write {
            document_id: document_id.into(),
            reason: reason.into(),
        }
    }

    pub fn delete(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Delete {
            document_id: document_id.into(),
            reason: reason.into(),
        }
    }

    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }
}
