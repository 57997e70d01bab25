//! PostgreSQL implementation of the publisher repository.

use async_trait::async_trait;
use bookstore_shared::admin::PUBLISHER_ADMIN;
use bookstore_shared::{EntityKind, NewPublisher, Page, PageRequest, Publisher};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::identity::{assign_sequential_id, SequentialIdPolicy};
use super::query::{fetch_page, PageQuery};
use crate::{CatalogRepositoryError, PublisherRepository};

pub(crate) const PUBLISHER_COLUMNS: &str =
    "uuid, id, name, address, city, state_province, country, website, latitude, longitude";

pub(crate) fn publisher_from_row(row: &PgRow) -> Result<Publisher, sqlx::Error> {
    Ok(Publisher {
        uuid: row.try_get("uuid")?,
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state_province: row.try_get("state_province")?,
        country: row.try_get("country")?,
        website: row.try_get("website")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}

/// PostgreSQL-backed publisher repository.
pub struct PostgresPublisherRepository {
    pool: sqlx::PgPool,
    policy: SequentialIdPolicy,
}

impl PostgresPublisherRepository {
    /// Creates a new publisher repository using the default id policy.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the catalog schema
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
}

#[async_trait]
impl PublisherRepository for PostgresPublisherRepository {
    async fn create(&self, publisher: NewPublisher) -> Result<Publisher, CatalogRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = assign_sequential_id(EntityKind::Publisher, &mut tx, self.policy).await?;

        sqlx::query(
            r#"
            INSERT INTO publishers (uuid, id, name, address, city, state_province, country, website, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(publisher.uuid)
        .bind(id)
        .bind(&publisher.name)
        .bind(&publisher.address)
        .bind(&publisher.city)
        .bind(&publisher.state_province)
        .bind(&publisher.country)
        .bind(&publisher.website)
        .bind(&publisher.latitude)
        .bind(&publisher.longitude)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(uuid = %publisher.uuid, id = id, "Publisher created");
        Ok(publisher.into_publisher(id))
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Publisher>, CatalogRepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PUBLISHER_COLUMNS} FROM publishers WHERE uuid = $1"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(publisher_from_row).transpose()?)
    }

    async fn update(
        &self,
        uuid: Uuid,
        changes: NewPublisher,
    ) -> Result<Publisher, CatalogRepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE publishers
            SET name = $2, address = $3, city = $4, state_province = $5, country = $6,
                website = $7, latitude = $8, longitude = $9
            WHERE uuid = $1
            RETURNING {PUBLISHER_COLUMNS}
            "#
        ))
        .bind(uuid)
        .bind(&changes.name)
        .bind(&changes.address)
        .bind(&changes.city)
        .bind(&changes.state_province)
        .bind(&changes.country)
        .bind(&changes.website)
        .bind(&changes.latitude)
        .bind(&changes.longitude)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                debug!(uuid = %uuid, "Publisher updated");
                Ok(publisher_from_row(&row)?)
            }
            None => Err(CatalogRepositoryError::not_found("publisher", uuid)),
        }
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let result = sqlx::query("DELETE FROM publishers WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogRepositoryError::from(e).on_delete())?;

        if result.rows_affected() == 0 {
            return Err(CatalogRepositoryError::not_found("publisher", uuid));
        }

        info!(uuid = %uuid, "Publisher deleted");
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Publisher>, CatalogRepositoryError> {
        self.search_page(None, page).await
    }

    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Publisher>, CatalogRepositoryError> {
        self.search_page(Some(term), page).await
    }
}

impl PostgresPublisherRepository {
    async fn search_page(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Publisher>, CatalogRepositoryError> {
        let query = PageQuery {
            table: "publishers",
            columns: PUBLISHER_COLUMNS,
            order_by: "id, uuid",
            search: term.map(|t| (PUBLISHER_ADMIN.search_fields, t)),
        };
        let (rows, total) = fetch_page(&self.pool, query, page).await?;
        let items = rows
            .iter()
            .map(publisher_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }
}
