use bookstore_shared::{NewPublisher, Page, PageRequest, Publisher};
use uuid::Uuid;

use crate::errors::CatalogRepositoryError;

/// Persistence for publishers.
///
/// Creation assigns the sequential display id. Deleting a publisher that still
/// has books fails with `CatalogRepositoryError::RestrictViolation`.
#[async_trait::async_trait]
pub trait PublisherRepository: Send + Sync {
    /// Inserts a new publisher, assigning its sequential id.
    async fn create(&self, publisher: NewPublisher) -> Result<Publisher, CatalogRepositoryError>;

    async fn get(&self, uuid: Uuid) -> Result<Option<Publisher>, CatalogRepositoryError>;

    /// Replaces the editable fields of an existing publisher.
    ///
    /// Returns `CatalogRepositoryError::NotFound` if no row has `uuid`.
    async fn update(
        &self,
        uuid: Uuid,
        changes: NewPublisher,
    ) -> Result<Publisher, CatalogRepositoryError>;

    /// Deletes a publisher that has no books.
    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError>;

    /// Lists publishers ordered by sequential id.
    async fn list(&self, page: PageRequest) -> Result<Page<Publisher>, CatalogRepositoryError>;

    /// Case-insensitive substring search over the admin search fields.
    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Publisher>, CatalogRepositoryError>;
}
