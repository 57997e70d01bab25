use bookstore_shared::{Author, NewAuthor, Page, PageRequest};
use uuid::Uuid;

use crate::errors::CatalogRepositoryError;

/// Persistence for authors.
#[async_trait::async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn create(&self, author: NewAuthor) -> Result<Author, CatalogRepositoryError>;

    async fn get(&self, uuid: Uuid) -> Result<Option<Author>, CatalogRepositoryError>;

    async fn update(&self, uuid: Uuid, changes: NewAuthor)
        -> Result<Author, CatalogRepositoryError>;

    /// Deletes an author and its book links. Books themselves are kept.
    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError>;

    async fn list(&self, page: PageRequest) -> Result<Page<Author>, CatalogRepositoryError>;

    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Author>, CatalogRepositoryError>;
}
