//! PostgreSQL implementation of the author repository.

use async_trait::async_trait;
use bookstore_shared::admin::AUTHOR_ADMIN;
use bookstore_shared::{Author, EntityKind, NewAuthor, Page, PageRequest};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::identity::{assign_sequential_id, SequentialIdPolicy};
use super::query::{fetch_page, PageQuery};
use crate::{AuthorRepository, CatalogRepositoryError};

const AUTHOR_COLUMNS: &str = "uuid, id, salutation, name, email, avatar";

pub(crate) fn author_from_row(row: &PgRow) -> Result<Author, sqlx::Error> {
    Ok(Author {
        uuid: row.try_get("uuid")?,
        id: row.try_get("id")?,
        salutation: row.try_get("salutation")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        avatar: row.try_get("avatar")?,
    })
}

/// PostgreSQL-backed author repository.
pub struct PostgresAuthorRepository {
    pool: sqlx::PgPool,
    policy: SequentialIdPolicy,
}

impl PostgresAuthorRepository {
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, CatalogRepositoryError> {
        Ok(Self {
            pool,
            policy: SequentialIdPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: SequentialIdPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn search_page(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Author>, CatalogRepositoryError> {
        let query = PageQuery {
            table: "authors",
            columns: AUTHOR_COLUMNS,
            order_by: "id, uuid",
            search: term.map(|t| (AUTHOR_ADMIN.search_fields, t)),
        };
        let (rows, total) = fetch_page(&self.pool, query, page).await?;
        let items = rows
            .iter()
            .map(author_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn create(&self, author: NewAuthor) -> Result<Author, CatalogRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = assign_sequential_id(EntityKind::Author, &mut tx, self.policy).await?;

        sqlx::query(
            "INSERT INTO authors (uuid, id, salutation, name, email, avatar) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(author.uuid)
        .bind(id)
        .bind(&author.salutation)
        .bind(&author.name)
        .bind(&author.email)
        .bind(&author.avatar)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(uuid = %author.uuid, id = id, "Author created");
        Ok(author.into_author(id))
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Author>, CatalogRepositoryError> {
        let row = sqlx::query(
            "SELECT uuid, id, salutation, name, email, avatar FROM authors WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(author_from_row).transpose()?)
    }

    async fn update(
        &self,
        uuid: Uuid,
        changes: NewAuthor,
    ) -> Result<Author, CatalogRepositoryError> {
        let row = sqlx::query(
            r#"
            UPDATE authors
            SET salutation = $2, name = $3, email = $4, avatar = $5
            WHERE uuid = $1
            RETURNING uuid, id, salutation, name, email, avatar
            "#,
        )
        .bind(uuid)
        .bind(&changes.salutation)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.avatar)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| CatalogRepositoryError::not_found("author", uuid))?;
        debug!(uuid = %uuid, "Author updated");
        Ok(author_from_row(&row)?)
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let result = sqlx::query("DELETE FROM authors WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogRepositoryError::not_found("author", uuid));
        }

        info!(uuid = %uuid, "Author deleted");
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Author>, CatalogRepositoryError> {
        self.search_page(None, page).await
    }

    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Author>, CatalogRepositoryError> {
        self.search_page(Some(term), page).await
    }
}
