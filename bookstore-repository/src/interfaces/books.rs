//! This module defines the `BookRepository` trait, the persistence interface
//! for books and their author/tag relations, plus the read paths the search
//! synchronization needs (loaded records and reverse lookups).
use bookstore_shared::{Book, BookRecord, NewBook, Page, PageRequest};
use uuid::Uuid;

use crate::errors::CatalogRepositoryError;

/// A trait that defines the interface for interacting with stored books.
#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Inserts a book with its author and tag links in one transaction.
    ///
    /// # Returns
    ///
    /// * `Ok(Book)` - The stored book with its assigned sequential id
    /// * `Err(CatalogRepositoryError::UniqueViolation)` - The ISBN is already used
    /// * `Err(CatalogRepositoryError::MissingReference)` - The publisher, an author or a tag does not exist
    async fn create(&self, book: NewBook) -> Result<Book, CatalogRepositoryError>;

    async fn get(&self, uuid: Uuid) -> Result<Option<Book>, CatalogRepositoryError>;

    /// Loads a book together with its publisher, authors and tags.
    async fn get_record(&self, uuid: Uuid) -> Result<Option<BookRecord>, CatalogRepositoryError>;

    /// Loads the records of every existing book in `uuids`, skipping unknown ones.
    async fn get_records(&self, uuids: &[Uuid]) -> Result<Vec<BookRecord>, CatalogRepositoryError>;

    /// Replaces the scalar fields and relations of a book.
    ///
    /// Links that are kept retain their original attachment position; new
    /// links are appended in the order given.
    async fn update(&self, uuid: Uuid, changes: NewBook) -> Result<Book, CatalogRepositoryError>;

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError>;

    /// Lists books ordered by ISBN.
    async fn list(&self, page: PageRequest) -> Result<Page<Book>, CatalogRepositoryError>;

    /// Lists loaded records ordered by ISBN, for full reindexing.
    async fn list_records(
        &self,
        page: PageRequest,
    ) -> Result<Page<BookRecord>, CatalogRepositoryError>;

    async fn search(&self, term: &str, page: PageRequest)
        -> Result<Page<Book>, CatalogRepositoryError>;

    async fn book_uuids_for_publisher(
        &self,
        publisher_uuid: Uuid,
    ) -> Result<Vec<Uuid>, CatalogRepositoryError>;

    async fn book_uuids_for_author(
        &self,
        author_uuid: Uuid,
    ) -> Result<Vec<Uuid>, CatalogRepositoryError>;

    async fn book_uuids_for_tag(&self, tag_uuid: Uuid) -> Result<Vec<Uuid>, CatalogRepositoryError>;
}
