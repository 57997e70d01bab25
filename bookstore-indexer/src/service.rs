//! Catalog service: CRUD over the catalog repositories with the post-commit
//! search synchronization hook.
//!
//! Every successful write publishes a [`SyncEvent`] after the repository has
//! committed. Publishing is fire-and-forget, so a slow or failing search
//! pipeline never fails or delays a catalog write.

use std::sync::Arc;

use bookstore_repository::{AuthorRepository, BookRepository, PublisherRepository, TagRepository};
use bookstore_shared::{
    Author, Book, BookRecord, NewAuthor, NewBook, NewPublisher, NewTag, Page, PageRequest,
    Publisher, Tag,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::errors::CatalogError;
use crate::events::{SyncEvent, SyncHandle};

/// Application-level access to the catalog.
#[derive(Clone)]
pub struct CatalogService {
    publishers: Arc<dyn PublisherRepository>,
    authors: Arc<dyn AuthorRepository>,
    tags: Arc<dyn TagRepository>,
    books: Arc<dyn BookRepository>,
    sync: SyncHandle,
    storage: StorageSettings,
}

impl CatalogService {
    pub fn new(
        publishers: Arc<dyn PublisherRepository>,
        authors: Arc<dyn AuthorRepository>,
        tags: Arc<dyn TagRepository>,
        books: Arc<dyn BookRepository>,
        sync: SyncHandle,
    ) -> Self {
        Self {
            publishers,
            authors,
            tags,
            books,
            sync,
            storage: StorageSettings::default(),
        }
    }

    /// Use `storage` to resolve uploaded file keys to public URLs.
    pub fn with_storage(mut self, storage: StorageSettings) -> Self {
        self.storage = storage;
        self
    }

    fn notify(&self, event: SyncEvent) {
        if !self.sync.notify(event) {
            debug!("Search index will be stale until the next reindex");
        }
    }

    fn require(value: &str, field: &str) -> Result<(), CatalogError> {
        if value.trim().is_empty() {
            return Err(CatalogError::validation(format!("{} is required", field)));
        }
        Ok(())
    }

    // Publishers

    #[instrument(skip(self, publisher), fields(uuid = %publisher.uuid))]
    pub async fn create_publisher(&self, publisher: NewPublisher) -> Result<Publisher, CatalogError> {
        Self::require(&publisher.name, "name")?;
        // A new publisher has no books yet, so nothing is indexed.
        Ok(self.publishers.create(publisher).await?)
    }

    pub async fn get_publisher(&self, uuid: Uuid) -> Result<Option<Publisher>, CatalogError> {
        Ok(self.publishers.get(uuid).await?)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_publisher(
        &self,
        uuid: Uuid,
        changes: NewPublisher,
    ) -> Result<Publisher, CatalogError> {
        Self::require(&changes.name, "name")?;
        let publisher = self.publishers.update(uuid, changes).await?;
        self.notify(SyncEvent::PublisherChanged(uuid));
        Ok(publisher)
    }

    /// Deletes a publisher. Fails with a restrict violation while it still
    /// has books.
    #[instrument(skip(self))]
    pub async fn delete_publisher(&self, uuid: Uuid) -> Result<(), CatalogError> {
        Ok(self.publishers.delete(uuid).await?)
    }

    pub async fn list_publishers(&self, page: PageRequest) -> Result<Page<Publisher>, CatalogError> {
        Ok(self.publishers.list(page).await?)
    }

    pub async fn search_publishers(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Publisher>, CatalogError> {
        Ok(self.publishers.search(term, page).await?)
    }

    // Authors

    #[instrument(skip(self, author), fields(uuid = %author.uuid))]
    pub async fn create_author(&self, author: NewAuthor) -> Result<Author, CatalogError> {
        Self::require(&author.name, "name")?;
        let uuid = author.uuid;
        let author = self.authors.create(author).await?;
        self.notify(SyncEvent::AuthorChanged(uuid));
        Ok(author)
    }

    pub async fn get_author(&self, uuid: Uuid) -> Result<Option<Author>, CatalogError> {
        Ok(self.authors.get(uuid).await?)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_author(&self, uuid: Uuid, changes: NewAuthor) -> Result<Author, CatalogError> {
        Self::require(&changes.name, "name")?;
        let author = self.authors.update(uuid, changes).await?;
        self.notify(SyncEvent::AuthorChanged(uuid));
        Ok(author)
    }

    #[instrument(skip(self))]
    pub async fn delete_author(&self, uuid: Uuid) -> Result<(), CatalogError> {
        self.authors.delete(uuid).await?;
        self.notify(SyncEvent::AuthorChanged(uuid));
        Ok(())
    }

    pub async fn list_authors(&self, page: PageRequest) -> Result<Page<Author>, CatalogError> {
        Ok(self.authors.list(page).await?)
    }

    pub async fn search_authors(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Author>, CatalogError> {
        Ok(self.authors.search(term, page).await?)
    }

    /// Public URL of the author's avatar, if one was uploaded.
    pub fn avatar_url(&self, author: &Author) -> Option<String> {
        author
            .avatar
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| self.storage.media_url(key))
    }

    // Tags

    #[instrument(skip(self, tag), fields(uuid = %tag.uuid))]
    pub async fn create_tag(&self, tag: NewTag) -> Result<Tag, CatalogError> {
        Self::require(&tag.title, "title")?;
        Ok(self.tags.create(tag).await?)
    }

    pub async fn get_tag(&self, uuid: Uuid) -> Result<Option<Tag>, CatalogError> {
        Ok(self.tags.get(uuid).await?)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_tag(&self, uuid: Uuid, changes: NewTag) -> Result<Tag, CatalogError> {
        Self::require(&changes.title, "title")?;
        let tag = self.tags.update(uuid, changes).await?;
        self.notify(SyncEvent::TagChanged(uuid));
        Ok(tag)
    }

    /// Deletes a tag and re-projects the books that carried it.
    ///
    /// The affected books are collected before the delete because the links
    /// cascade with the tag.
    #[instrument(skip(self))]
    pub async fn delete_tag(&self, uuid: Uuid) -> Result<(), CatalogError> {
        let affected = self.books.book_uuids_for_tag(uuid).await?;
        self.tags.delete(uuid).await?;
        if !affected.is_empty() {
            self.notify(SyncEvent::BooksChanged(affected));
        }
        Ok(())
    }

    pub async fn list_tags(&self, page: PageRequest) -> Result<Page<Tag>, CatalogError> {
        Ok(self.tags.list(page).await?)
    }

    pub async fn search_tags(&self, term: &str, page: PageRequest) -> Result<Page<Tag>, CatalogError> {
        Ok(self.tags.search(term, page).await?)
    }

    // Books

    #[instrument(skip(self, book), fields(uuid = %book.uuid, isbn = %book.isbn))]
    pub async fn create_book(&self, book: NewBook) -> Result<Book, CatalogError> {
        book.validate()
            .map_err(|e| CatalogError::validation(e.to_string()))?;
        let book = self.books.create(book).await?;
        self.notify(SyncEvent::BookChanged(book.uuid));
        Ok(book)
    }

    pub async fn get_book(&self, uuid: Uuid) -> Result<Option<Book>, CatalogError> {
        Ok(self.books.get(uuid).await?)
    }

    /// Loads a book with its publisher, authors and tags.
    pub async fn get_book_record(&self, uuid: Uuid) -> Result<Option<BookRecord>, CatalogError> {
        Ok(self.books.get_record(uuid).await?)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_book(&self, uuid: Uuid, changes: NewBook) -> Result<Book, CatalogError> {
        changes
            .validate()
            .map_err(|e| CatalogError::validation(e.to_string()))?;
        let book = self.books.update(uuid, changes).await?;
        self.notify(SyncEvent::BookChanged(uuid));
        Ok(book)
    }

    #[instrument(skip(self))]
    pub async fn delete_book(&self, uuid: Uuid) -> Result<(), CatalogError> {
        self.books.delete(uuid).await?;
        self.notify(SyncEvent::BookDeleted(uuid));
        Ok(())
    }

    pub async fn list_books(&self, page: PageRequest) -> Result<Page<Book>, CatalogError> {
        Ok(self.books.list(page).await?)
    }

    pub async fn search_books(&self, term: &str, page: PageRequest) -> Result<Page<Book>, CatalogError> {
        Ok(self.books.search(term, page).await?)
    }
}
