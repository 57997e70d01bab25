//! PostgreSQL implementation of the tag repository.

use async_trait::async_trait;
use bookstore_shared::admin::TAG_ADMIN;
use bookstore_shared::{EntityKind, NewTag, Page, PageRequest, Tag};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use super::identity::{assign_sequential_id, SequentialIdPolicy};
use super::query::{fetch_page, PageQuery};
use crate::{CatalogRepositoryError, TagRepository};

pub(crate) fn tag_from_row(row: &PgRow) -> Result<Tag, sqlx::Error> {
    Ok(Tag {
        uuid: row.try_get("uuid")?,
        id: row.try_get("id")?,
        title: row.try_get("title")?,
    })
}

/// PostgreSQL-backed tag repository.
pub struct PostgresTagRepository {
    pool: sqlx::PgPool,
    policy: SequentialIdPolicy,
}

impl PostgresTagRepository {
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
    ) -> Result<Page<Tag>, CatalogRepositoryError> {
        let query = PageQuery {
            table: "tags",
            columns: "uuid, id, title",
            order_by: "title",
            search: term.map(|t| (TAG_ADMIN.search_fields, t)),
        };
        let (rows, total) = fetch_page(&self.pool, query, page).await?;
        let items = rows.iter().map(tag_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn create(&self, tag: NewTag) -> Result<Tag, CatalogRepositoryError> {
        if tag.title.trim().is_empty() {
            return Err(CatalogRepositoryError::validation("title is required"));
        }

        let mut tx = self.pool.begin().await?;
        let id = assign_sequential_id(EntityKind::Tag, &mut tx, self.policy).await?;

        sqlx::query("INSERT INTO tags (uuid, id, title) VALUES ($1, $2, $3)")
            .bind(tag.uuid)
            .bind(id)
            .bind(&tag.title)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(uuid = %tag.uuid, id = id, title = %tag.title, "Tag created");
        Ok(tag.into_tag(id))
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Tag>, CatalogRepositoryError> {
        let row = sqlx::query("SELECT uuid, id, title FROM tags WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(tag_from_row).transpose()?)
    }

    async fn update(&self, uuid: Uuid, changes: NewTag) -> Result<Tag, CatalogRepositoryError> {
        if changes.title.trim().is_empty() {
            return Err(CatalogRepositoryError::validation("title is required"));
        }

        let row = sqlx::query("UPDATE tags SET title = $2 WHERE uuid = $1 RETURNING uuid, id, title")
            .bind(uuid)
            .bind(&changes.title)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| CatalogRepositoryError::not_found("tag", uuid))?;
        Ok(tag_from_row(&row)?)
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let result = sqlx::query("DELETE FROM tags WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogRepositoryError::not_found("tag", uuid));
        }

        info!(uuid = %uuid, "Tag deleted");
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Tag>, CatalogRepositoryError> {
        self.search_page(None, page).await
    }

    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Tag>, CatalogRepositoryError> {
        self.search_page(Some(term), page).await
    }
}
