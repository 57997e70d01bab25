//! Book processor implementation.
//!
//! Turns catalog change events into `BookDocument`s ready for indexing.

use std::collections::HashSet;
use std::sync::Arc;

use bookstore_repository::BookRepository;
use bookstore_shared::BookDocument;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::SyncError;
use crate::events::SyncEvent;

/// Processed result from the book processor.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedEvent {
    /// Document to be indexed (create or replace).
    Index(BookDocument),
    /// Document to be deleted.
    Delete(Uuid),
}

/// Books touched by a batch of events, in first-seen order.
#[derive(Debug, Default, PartialEq)]
struct Affected {
    index: Vec<Uuid>,
    delete: Vec<Uuid>,
}

impl Affected {
    fn mark_changed(&mut self, uuid: Uuid) {
        self.delete.retain(|u| *u != uuid);
        if !self.index.contains(&uuid) {
            self.index.push(uuid);
        }
    }

    fn mark_deleted(&mut self, uuid: Uuid) {
        self.index.retain(|u| *u != uuid);
        if !self.delete.contains(&uuid) {
            self.delete.push(uuid);
        }
    }
}

/// Processor that resolves catalog events into search documents.
///
/// The processor is responsible for:
/// - Fanning publisher and tag changes out to the books they appear on
/// - Collapsing repeated events for the same book within a batch
/// - Loading each affected book and projecting it into a `BookDocument`
pub struct BookProcessor {
    books: Arc<dyn BookRepository>,
}

impl BookProcessor {
    /// Create a new book processor reading from `books`.
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    /// Process a batch of catalog events.
    ///
    /// A book that is changed and then deleted within the same batch is only
    /// deleted, and the other way round. A changed book that no longer exists
    /// when it is loaded is deleted.
    #[instrument(skip(self, events), fields(event_count = events.len()))]
    pub async fn process_batch(
        &self,
        events: Vec<SyncEvent>,
    ) -> Result<Vec<ProcessedEvent>, SyncError> {
        let mut affected = Affected::default();

        for event in events {
            self.resolve_event(event, &mut affected).await?;
        }

        let records = if affected.index.is_empty() {
            Vec::new()
        } else {
            self.books.get_records(&affected.index).await?
        };
        let found: HashSet<Uuid> = records.iter().map(|r| r.book.uuid).collect();

        let mut processed = Vec::with_capacity(affected.index.len() + affected.delete.len());
        processed.extend(
            records
                .iter()
                .map(|record| ProcessedEvent::Index(BookDocument::from_record(record))),
        );
        processed.extend(
            affected
                .index
                .iter()
                .filter(|uuid| !found.contains(uuid))
                .map(|uuid| ProcessedEvent::Delete(*uuid)),
        );
        processed.extend(affected.delete.into_iter().map(ProcessedEvent::Delete));

        debug!(processed_count = processed.len(), "Processed event batch");
        Ok(processed)
    }

    /// Record which books a single event touches.
    async fn resolve_event(
        &self,
        event: SyncEvent,
        affected: &mut Affected,
    ) -> Result<(), SyncError> {
        match event {
            SyncEvent::BookChanged(uuid) => affected.mark_changed(uuid),
            SyncEvent::BookDeleted(uuid) => affected.mark_deleted(uuid),
            SyncEvent::BooksChanged(uuids) => {
                uuids.into_iter().for_each(|uuid| affected.mark_changed(uuid));
            }
            SyncEvent::PublisherChanged(uuid) => {
                let books = self.books.book_uuids_for_publisher(uuid).await?;
                debug!(publisher = %uuid, books = books.len(), "Publisher change fans out");
                books.into_iter().for_each(|book| affected.mark_changed(book));
            }
            SyncEvent::TagChanged(uuid) => {
                let books = self.books.book_uuids_for_tag(uuid).await?;
                debug!(tag = %uuid, books = books.len(), "Tag change fans out");
                books.into_iter().for_each(|book| affected.mark_changed(book));
            }
            // Author fields are not part of the book document.
            SyncEvent::AuthorChanged(uuid) => {
                debug!(author = %uuid, "Skipping author change");
            }
        }
        Ok(())
    }
}
