//! PostgreSQL implementation of the book repository, including the
//! `book_authors` and `book_tags` relations and the record loading used by
//! search synchronization.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bookstore_shared::admin::BOOK_ADMIN;
use bookstore_shared::{
    Author, Book, BookRecord, BookStatus, EntityKind, NewBook, Page, PageRequest, Publisher, Tag,
};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::authors::author_from_row;
use super::identity::{assign_sequential_id, SequentialIdPolicy};
use super::publishers::{publisher_from_row, PUBLISHER_COLUMNS};
use super::query::{fetch_page, PageQuery};
use super::tags::tag_from_row;
use crate::{BookRepository, CatalogRepositoryError};

const BOOK_COLUMNS: &str = "uuid, id, title, description, summary, publisher_uuid, \
     publication_date, state, isbn, price, pages, stock_count";

/// A many-to-many relation table hanging off `books`.
#[derive(Debug, Clone, Copy)]
struct Relation {
    table: &'static str,
    column: &'static str,
}

const AUTHORS: Relation = Relation {
    table: "book_authors",
    column: "author_uuid",
};

const TAGS: Relation = Relation {
    table: "book_tags",
    column: "tag_uuid",
};

fn book_from_row(row: &PgRow) -> Result<Book, sqlx::Error> {
    let state: String = row.try_get("state")?;
    let status = state
        .parse::<BookStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Book {
        uuid: row.try_get("uuid")?,
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        summary: row.try_get("summary")?,
        publisher_uuid: row.try_get("publisher_uuid")?,
        publication_date: row.try_get("publication_date")?,
        status,
        isbn: row.try_get("isbn")?,
        price: row.try_get("price")?,
        pages: row.try_get("pages")?,
        stock_count: row.try_get("stock_count")?,
    })
}

/// Drops repeated uuids, keeping the first occurrence.
fn dedup_preserving_order(uuids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(uuids.len());
    uuids.iter().copied().filter(|u| seen.insert(*u)).collect()
}

/// PostgreSQL-backed book repository.
pub struct PostgresBookRepository {
    pool: sqlx::PgPool,
    policy: SequentialIdPolicy,
}

impl PostgresBookRepository {
    /// Creates a new book repository using the default id policy.
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

    /// Appends links for `uuids` that are not attached yet, in the order given.
    async fn attach_links_tx(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        relation: Relation,
        book_uuid: Uuid,
        uuids: &[Uuid],
    ) -> Result<(), CatalogRepositoryError> {
        let sql = format!(
            "INSERT INTO {} (book_uuid, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            relation.table, relation.column
        );
        for uuid in uuids {
            sqlx::query(&sql)
                .bind(book_uuid)
                .bind(uuid)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Makes the links of `book_uuid` equal to `uuids`. Links that survive keep
    /// their original position.
    async fn replace_links_tx(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        relation: Relation,
        book_uuid: Uuid,
        uuids: &[Uuid],
    ) -> Result<(), CatalogRepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE book_uuid = $1 AND NOT ({} = ANY($2))",
            relation.table, relation.column
        );
        sqlx::query(&sql)
            .bind(book_uuid)
            .bind(uuids)
            .execute(&mut **tx)
            .await?;

        Self::attach_links_tx(tx, relation, book_uuid, uuids).await
    }

    /// Loads publishers, authors and tags for `books` with one query per relation.
    async fn load_records(&self, books: Vec<Book>) -> Result<Vec<BookRecord>, CatalogRepositoryError> {
        if books.is_empty() {
            return Ok(Vec::new());
        }

        let book_uuids: Vec<Uuid> = books.iter().map(|b| b.uuid).collect();
        let publisher_uuids = dedup_preserving_order(
            &books.iter().map(|b| b.publisher_uuid).collect::<Vec<_>>(),
        );

        let publisher_rows = sqlx::query(&format!(
            "SELECT {PUBLISHER_COLUMNS} FROM publishers WHERE uuid = ANY($1)"
        ))
        .bind(&publisher_uuids)
        .fetch_all(&self.pool)
        .await?;
        let mut publishers: HashMap<Uuid, Publisher> = HashMap::new();
        for row in &publisher_rows {
            let publisher = publisher_from_row(row)?;
            publishers.insert(publisher.uuid, publisher);
        }

        let author_rows = sqlx::query(
            r#"
            SELECT ba.book_uuid, a.uuid, a.id, a.salutation, a.name, a.email, a.avatar
            FROM book_authors ba
            JOIN authors a ON a.uuid = ba.author_uuid
            WHERE ba.book_uuid = ANY($1)
            ORDER BY ba.book_uuid, ba.position
            "#,
        )
        .bind(&book_uuids)
        .fetch_all(&self.pool)
        .await?;
        let mut authors: HashMap<Uuid, Vec<Author>> = HashMap::new();
        for row in &author_rows {
            let book_uuid: Uuid = row.try_get("book_uuid")?;
            authors.entry(book_uuid).or_default().push(author_from_row(row)?);
        }

        let tag_rows = sqlx::query(
            r#"
            SELECT bt.book_uuid, t.uuid, t.id, t.title
            FROM book_tags bt
            JOIN tags t ON t.uuid = bt.tag_uuid
            WHERE bt.book_uuid = ANY($1)
            ORDER BY bt.book_uuid, bt.position
            "#,
        )
        .bind(&book_uuids)
        .fetch_all(&self.pool)
        .await?;
        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in &tag_rows {
            let book_uuid: Uuid = row.try_get("book_uuid")?;
            tags.entry(book_uuid).or_default().push(tag_from_row(row)?);
        }

        Ok(books
            .into_iter()
            .map(|book| BookRecord {
                publisher: publishers.get(&book.publisher_uuid).cloned(),
                authors: authors.remove(&book.uuid).unwrap_or_default(),
                tags: tags.remove(&book.uuid).unwrap_or_default(),
                book,
            })
            .collect())
    }

    async fn search_page(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Book>, CatalogRepositoryError> {
        let query = PageQuery {
            table: "books",
            columns: BOOK_COLUMNS,
            order_by: "isbn",
            search: term.map(|t| (BOOK_ADMIN.search_fields, t)),
        };
        let (rows, total) = fetch_page(&self.pool, query, page).await?;
        let items = rows.iter().map(book_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn uuids(&self, sql: &str, key: Uuid) -> Result<Vec<Uuid>, CatalogRepositoryError> {
        let uuids: Vec<Uuid> = sqlx::query_scalar(sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await?;
        Ok(uuids)
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    #[instrument(skip(self, book), fields(uuid = %book.uuid, isbn = %book.isbn))]
    async fn create(&self, book: NewBook) -> Result<Book, CatalogRepositoryError> {
        book.validate()
            .map_err(|e| CatalogRepositoryError::validation(e.to_string()))?;

        let authors = dedup_preserving_order(&book.author_uuids);
        let tags = dedup_preserving_order(&book.tag_uuids);

        let mut tx = self.pool.begin().await?;
        let id = assign_sequential_id(EntityKind::Book, &mut tx, self.policy).await?;

        sqlx::query(
            r#"
            INSERT INTO books (uuid, id, title, description, summary, publisher_uuid,
                               publication_date, state, isbn, price, pages, stock_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(book.uuid)
        .bind(id)
        .bind(&book.title)
        .bind(&book.description)
        .bind(&book.summary)
        .bind(book.publisher_uuid)
        .bind(book.publication_date)
        .bind(book.status.as_str())
        .bind(&book.isbn)
        .bind(&book.price)
        .bind(book.pages)
        .bind(book.stock_count)
        .execute(&mut *tx)
        .await?;

        Self::attach_links_tx(&mut tx, AUTHORS, book.uuid, &authors).await?;
        Self::attach_links_tx(&mut tx, TAGS, book.uuid, &tags).await?;

        tx.commit().await?;

        info!(id = id, authors = authors.len(), tags = tags.len(), "Book created");
        Ok(book.to_book(id))
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Book>, CatalogRepositoryError> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE uuid = $1"))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(book_from_row).transpose()?)
    }

    async fn get_record(&self, uuid: Uuid) -> Result<Option<BookRecord>, CatalogRepositoryError> {
        let Some(book) = self.get(uuid).await? else {
            return Ok(None);
        };
        Ok(self.load_records(vec![book]).await?.pop())
    }

    async fn get_records(&self, uuids: &[Uuid]) -> Result<Vec<BookRecord>, CatalogRepositoryError> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE uuid = ANY($1) ORDER BY isbn"
        ))
        .bind(uuids)
        .fetch_all(&self.pool)
        .await?;
        let books = rows.iter().map(book_from_row).collect::<Result<Vec<_>, _>>()?;

        debug!(requested = uuids.len(), found = books.len(), "Loaded book records");
        self.load_records(books).await
    }

    #[instrument(skip(self, changes), fields(isbn = %changes.isbn))]
    async fn update(&self, uuid: Uuid, changes: NewBook) -> Result<Book, CatalogRepositoryError> {
        changes
            .validate()
            .map_err(|e| CatalogRepositoryError::validation(e.to_string()))?;

        let authors = dedup_preserving_order(&changes.author_uuids);
        let tags = dedup_preserving_order(&changes.tag_uuids);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE books
            SET title = $2, description = $3, summary = $4, publisher_uuid = $5,
                publication_date = $6, state = $7, isbn = $8, price = $9,
                pages = $10, stock_count = $11
            WHERE uuid = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(uuid)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.summary)
        .bind(changes.publisher_uuid)
        .bind(changes.publication_date)
        .bind(changes.status.as_str())
        .bind(&changes.isbn)
        .bind(&changes.price)
        .bind(changes.pages)
        .bind(changes.stock_count)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(CatalogRepositoryError::not_found("book", uuid));
        };
        let book = book_from_row(&row)?;

        Self::replace_links_tx(&mut tx, AUTHORS, uuid, &authors).await?;
        Self::replace_links_tx(&mut tx, TAGS, uuid, &tags).await?;

        tx.commit().await?;

        debug!(uuid = %uuid, "Book updated");
        Ok(book)
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogRepositoryError::not_found("book", uuid));
        }

        info!(uuid = %uuid, "Book deleted");
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Book>, CatalogRepositoryError> {
        self.search_page(None, page).await
    }

    async fn list_records(
        &self,
        page: PageRequest,
    ) -> Result<Page<BookRecord>, CatalogRepositoryError> {
        let books = self.search_page(None, page).await?;
        let (page, page_size, total) = (books.page, books.page_size, books.total);
        let records = self.load_records(books.items).await?;

        Ok(Page {
            items: records,
            page,
            page_size,
            total,
        })
    }

    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Book>, CatalogRepositoryError> {
        self.search_page(Some(term), page).await
    }

    async fn book_uuids_for_publisher(
        &self,
        publisher_uuid: Uuid,
    ) -> Result<Vec<Uuid>, CatalogRepositoryError> {
        self.uuids(
            "SELECT uuid FROM books WHERE publisher_uuid = $1 ORDER BY isbn",
            publisher_uuid,
        )
        .await
    }

    async fn book_uuids_for_author(
        &self,
        author_uuid: Uuid,
    ) -> Result<Vec<Uuid>, CatalogRepositoryError> {
        self.uuids(
            "SELECT book_uuid FROM book_authors WHERE author_uuid = $1 ORDER BY position",
            author_uuid,
        )
        .await
    }

    async fn book_uuids_for_tag(&self, tag_uuid: Uuid) -> Result<Vec<Uuid>, CatalogRepositoryError> {
        self.uuids(
            "SELECT book_uuid FROM book_tags WHERE tag_uuid = $1 ORDER BY position",
            tag_uuid,
        )
        .await
    }
}
