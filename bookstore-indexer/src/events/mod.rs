//! Catalog change events and the handle used to publish them.
//!
//! Events are emitted by `CatalogService` after a write commits and consumed
//! by the orchestrator. Publishing never blocks and never fails the write:
//! when the channel is full or closed the event is dropped and logged.

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// A committed catalog change that may affect indexed book documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A book was created or updated.
    BookChanged(Uuid),
    /// A book was deleted.
    BookDeleted(Uuid),
    /// A publisher was updated; every book it publishes is re-projected.
    PublisherChanged(Uuid),
    /// An author was created, updated or deleted.
    AuthorChanged(Uuid),
    /// A tag was renamed; every book carrying it is re-projected.
    TagChanged(Uuid),
    /// Books to re-project, collected before their relation was removed.
    BooksChanged(Vec<Uuid>),
}

impl SyncEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::BookChanged(_) => "book_changed",
            SyncEvent::BookDeleted(_) => "book_deleted",
            SyncEvent::PublisherChanged(_) => "publisher_changed",
            SyncEvent::AuthorChanged(_) => "author_changed",
            SyncEvent::TagChanged(_) => "tag_changed",
            SyncEvent::BooksChanged(_) => "books_changed",
        }
    }
}

/// Sending side of the sync channel.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    sender: mpsc::Sender<SyncEvent>,
}

impl SyncHandle {
    /// Create a bounded sync channel.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, receiver)
    }

    /// Publish `event` without waiting.
    ///
    /// Returns `false` when the event was dropped.
    pub fn notify(&self, event: SyncEvent) -> bool {
        let kind = event.kind();
        match self.sender.try_send(event) {
            Ok(()) => {
                debug!(event = kind, "Queued sync event");
                true
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(event = ?event, "Sync channel full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(event = ?event, "Sync channel closed, dropping event");
                false
            }
        }
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_delivers_in_order() {
        let (handle, mut receiver) = SyncHandle::channel(4);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(handle.notify(SyncEvent::BookChanged(a)));
        assert!(handle.notify(SyncEvent::BookDeleted(b)));

        assert_eq!(receiver.recv().await, Some(SyncEvent::BookChanged(a)));
        assert_eq!(receiver.recv().await, Some(SyncEvent::BookDeleted(b)));
    }

    #[tokio::test]
    async fn test_notify_drops_when_full() {
        let (handle, _receiver) = SyncHandle::channel(1);

        assert!(handle.notify(SyncEvent::TagChanged(Uuid::new_v4())));
        assert!(!handle.notify(SyncEvent::TagChanged(Uuid::new_v4())));
    }

    #[tokio::test]
    async fn test_notify_drops_when_closed() {
        let (handle, receiver) = SyncHandle::channel(4);
        drop(receiver);

        assert!(handle.is_closed());
        assert!(!handle.notify(SyncEvent::AuthorChanged(Uuid::new_v4())));
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(SyncEvent::BooksChanged(vec![]).kind(), "books_changed");
        assert_eq!(SyncEvent::PublisherChanged(Uuid::nil()).kind(), "publisher_changed");
    }
}
