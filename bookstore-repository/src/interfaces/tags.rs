use bookstore_shared::{NewTag, Page, PageRequest, Tag};
use uuid::Uuid;

use crate::errors::CatalogRepositoryError;

/// Persistence for tags. Titles are unique; a duplicate fails with
/// `CatalogRepositoryError::UniqueViolation`.
#[async_trait::async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, tag: NewTag) -> Result<Tag, CatalogRepositoryError>;

    async fn get(&self, uuid: Uuid) -> Result<Option<Tag>, CatalogRepositoryError>;

    /// Renames a tag. Only `changes.title` is used.
    async fn update(&self, uuid: Uuid, changes: NewTag) -> Result<Tag, CatalogRepositoryError>;

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError>;

    async fn list(&self, page: PageRequest) -> Result<Page<Tag>, CatalogRepositoryError>;

    async fn search(&self, term: &str, page: PageRequest)
        -> Result<Page<Tag>, CatalogRepositoryError>;
}
