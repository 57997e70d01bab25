//! Full reindex of the book catalog.

use std::sync::Arc;

use bookstore_repository::BookRepository;
use bookstore_search_repository::SearchIndexService;
use bookstore_shared::{BookDocument, PageRequest};
use tracing::{info, instrument, warn};

use crate::errors::SyncError;

/// Number of books loaded and indexed per round trip.
pub const REINDEX_PAGE_SIZE: u32 = 100;

/// Outcome of a full reindex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReindexSummary {
    pub pages: u32,
    pub indexed: usize,
    pub failed: usize,
}

/// Re-projects every stored book and upserts it into the search index.
///
/// Documents are keyed by book UUID, so running it repeatedly converges to
/// the same index contents. `run` only upserts; `rebuild` also drops
/// documents of books that no longer exist.
pub struct Reindexer {
    books: Arc<dyn BookRepository>,
    search: SearchIndexService,
    page_size: u32,
}

impl Reindexer {
    pub fn new(books: Arc<dyn BookRepository>, search: SearchIndexService) -> Self {
        Self {
            books,
            search,
            page_size: REINDEX_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Recreate the index empty, then load every stored book into it.
    #[instrument(skip(self))]
    pub async fn rebuild(&self) -> Result<ReindexSummary, SyncError> {
        info!("Recreating search index");
        self.search.recreate_index().await?;
        self.run().await
    }

    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<ReindexSummary, SyncError> {
        self.search.ensure_index_exists().await?;

        let mut summary = ReindexSummary::default();
        let mut request = PageRequest::page(1).with_page_size(self.page_size);

        loop {
            let page = self.books.list_records(request).await?;
            let documents: Vec<BookDocument> =
                page.items.iter().map(BookDocument::from_record).collect();

            let result = self.search.batch_index(documents).await?;
            for failure in result.failures() {
                warn!(
                    document_id = %failure.document_id,
                    error = ?failure.error,
                    "Failed to reindex book"
                );
            }

            summary.pages += 1;
            summary.indexed += result.succeeded;
            summary.failed += result.failed;

            if !page.has_next() || page.items.is_empty() {
                break;
            }
            request = PageRequest::page(page.page + 1).with_page_size(self.page_size);
        }

        info!(
            pages = summary.pages,
            indexed = summary.indexed,
            failed = summary.failed,
            "Reindex complete"
        );
        Ok(summary)
    }
}
