//! PostgreSQL implementation of the catalog repositories.
//!
//! Provides a PostgreSQL backend for the repository traits with connection
//! pooling, per-operation transactions and integrity error classification.
//!
//! ## Database Tables
//!
//! - `publishers`, `authors`, `tags`, `books`: Catalog entities, keyed by UUID
//!   with a sequential display `id`
//! - `book_authors`, `book_tags`: Many-to-many links in attachment order
//!
//! The schema lives in `migrations/` and is applied with [`run_migrations`].
mod authors;
mod books;
mod identity;
mod publishers;
mod query;
mod tags;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::errors::CatalogRepositoryError;

pub use authors::PostgresAuthorRepository;
pub use books::PostgresBookRepository;
pub use identity::{assign_sequential_id, SequentialIdPolicy};
pub use publishers::PostgresPublisherRepository;
pub use tags::PostgresTagRepository;

/// Maximum number of pooled connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Opens a connection pool to the database at `url`.
pub async fn connect(url: &str) -> Result<sqlx::PgPool, CatalogRepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .connect(url)
        .await?;
    Ok(pool)
}

/// Applies the embedded catalog migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), CatalogRepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Catalog migrations applied");
    Ok(())
}
