//! Integration tests for the PostgreSQL catalog repositories.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test --test postgres_catalog`

use std::str::FromStr;

use bigdecimal::BigDecimal;
use bookstore_repository::{
    AuthorRepository, BookRepository, CatalogRepositoryError, PostgresAuthorRepository,
    PostgresBookRepository, PostgresPublisherRepository, PostgresTagRepository,
    PublisherRepository, SequentialIdPolicy, TagRepository,
};
use bookstore_shared::{
    BookStatus, NewAuthor, NewBook, NewPublisher, NewTag, PageRequest, Publisher, Tag,
};
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

/// Creates a publisher input with default values.
fn make_publisher(name: &str) -> NewPublisher {
    NewPublisher::new(
        name,
        "1 Bedford Square",
        "London",
        "Greater London",
        "UK",
        "https://example.com",
    )
}

/// Creates a book input with default values.
fn make_book(isbn: &str, publisher_uuid: Uuid) -> NewBook {
    NewBook::new(
        format!("Book {isbn}"),
        isbn,
        publisher_uuid,
        NaiveDate::from_ymd_opt(1949, 6, 8).unwrap(),
        BigDecimal::from_str("12.50").unwrap(),
    )
}

struct Catalog {
    publishers: PostgresPublisherRepository,
    authors: PostgresAuthorRepository,
    tags: PostgresTagRepository,
    books: PostgresBookRepository,
}

async fn catalog(pool: &sqlx::PgPool) -> Catalog {
    Catalog {
        publishers: PostgresPublisherRepository::new(pool.clone()).await.unwrap(),
        authors: PostgresAuthorRepository::new(pool.clone()).await.unwrap(),
        tags: PostgresTagRepository::new(pool.clone()).await.unwrap(),
        books: PostgresBookRepository::new(pool.clone()).await.unwrap(),
    }
}

async fn seed_publisher(catalog: &Catalog) -> Publisher {
    catalog
        .publishers
        .create(make_publisher("Secker & Warburg"))
        .await
        .unwrap()
}

async fn seed_tags(catalog: &Catalog, titles: &[&str]) -> Vec<Tag> {
    let mut tags = Vec::new();
    for title in titles {
        tags.push(catalog.tags.create(NewTag::new(*title)).await.unwrap());
    }
    tags
}

// ============================================================================
// Sequential Id Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_first_entity_gets_id_one(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;

    let publisher = seed_publisher(&catalog).await;
    let author = catalog
        .authors
        .create(NewAuthor::new("Mr", "George Orwell", "orwell@example.com"))
        .await
        .unwrap();

    assert_eq!(publisher.id, 1);
    assert_eq!(author.id, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_id_is_one_more_than_current_max(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;

    sqlx::query("INSERT INTO tags (uuid, id, title) VALUES ($1, 41, 'legacy')")
        .bind(Uuid::new_v4())
        .execute(&pool)
        .await
        .unwrap();

    let tag = catalog.tags.create(NewTag::new("fiction")).await.unwrap();
    assert_eq!(tag.id, 42);

    // Deleting the highest row lets its id be handed out again.
    catalog.tags.delete(tag.uuid).await.unwrap();
    let again = catalog.tags.create(NewTag::new("classic")).await.unwrap();
    assert_eq!(again.id, 42);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ids_are_counted_per_entity_type(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;

    let publisher = seed_publisher(&catalog).await;
    let tags = seed_tags(&catalog, &["a", "b", "c"]).await;
    let book = catalog
        .books
        .create(make_book("111", publisher.uuid))
        .await
        .unwrap();

    assert_eq!(tags.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(book.id, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_serialized_policy_gives_distinct_ids_under_concurrency(pool: sqlx::PgPool) {
    let mut handles = Vec::new();
    for i in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let repository = PostgresAuthorRepository::new(pool)
                .await
                .unwrap()
                .with_policy(SequentialIdPolicy::Serialized);
            repository
                .create(NewAuthor::new("", format!("Author {i}"), "a@example.com"))
                .await
                .unwrap()
                .id
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();

    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
}

// ============================================================================
// Integrity Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_isbn_is_rejected(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;

    catalog
        .books
        .create(make_book("111", publisher.uuid))
        .await
        .unwrap();
    let err = catalog
        .books
        .create(make_book("111", publisher.uuid))
        .await
        .unwrap_err();

    assert!(err.is_unique_violation());
    assert!(matches!(
        err,
        CatalogRepositoryError::UniqueViolation { ref constraint } if constraint == "books_isbn_key"
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_tag_title_is_rejected(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;

    catalog.tags.create(NewTag::new("fiction")).await.unwrap();
    let err = catalog.tags.create(NewTag::new("fiction")).await.unwrap_err();

    assert!(err.is_unique_violation());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_publisher_with_books_is_restricted(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;
    let book = catalog
        .books
        .create(make_book("111", publisher.uuid))
        .await
        .unwrap();

    let err = catalog.publishers.delete(publisher.uuid).await.unwrap_err();
    assert!(err.is_restrict_violation());
    assert!(catalog.publishers.get(publisher.uuid).await.unwrap().is_some());

    catalog.books.delete(book.uuid).await.unwrap();
    catalog.publishers.delete(publisher.uuid).await.unwrap();
    assert!(catalog.publishers.get(publisher.uuid).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_book_with_unknown_publisher_is_rejected(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;

    let err = catalog
        .books
        .create(make_book("111", Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogRepositoryError::MissingReference { .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_book_is_rejected_before_insert(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;

    let mut book = make_book("111", publisher.uuid);
    book.price = BigDecimal::from_str("1.005").unwrap();
    let err = catalog.books.create(book).await.unwrap_err();

    assert!(matches!(err, CatalogRepositoryError::Validation(_)));
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publisher_update_returns_stored_row(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;

    let mut changes = make_publisher("Harvill Secker");
    changes.city = "Oxford".to_string();
    let updated = catalog
        .publishers
        .update(publisher.uuid, changes)
        .await
        .unwrap();

    assert_eq!(updated.uuid, publisher.uuid);
    assert_eq!(updated.id, publisher.id);
    assert_eq!(updated.name, "Harvill Secker");
    assert_eq!(updated.city, "Oxford");

    let stored = catalog.publishers.get(publisher.uuid).await.unwrap();
    assert_eq!(stored, Some(updated));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_rows_report_not_found(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let missing = Uuid::new_v4();

    assert!(matches!(
        catalog.tags.delete(missing).await,
        Err(CatalogRepositoryError::NotFound { entity: "tag", .. })
    ));
    assert!(matches!(
        catalog.authors.update(missing, NewAuthor::new("", "x", "x@example.com")).await,
        Err(CatalogRepositoryError::NotFound { entity: "author", .. })
    ));
}

// ============================================================================
// Book Record Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_record_views_follow_relations(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;
    let tags = seed_tags(&catalog, &["fiction", "classic"]).await;
    let author = catalog
        .authors
        .create(NewAuthor::new("Mr", "George Orwell", "orwell@example.com"))
        .await
        .unwrap();

    let book = catalog
        .books
        .create(
            make_book("111", publisher.uuid)
                .with_authors(vec![author.uuid])
                .with_tags(tags.iter().map(|t| t.uuid).collect()),
        )
        .await
        .unwrap();

    let record = catalog.books.get_record(book.uuid).await.unwrap().unwrap();
    assert_eq!(record.publisher_indexing(), Some("Secker & Warburg"));
    assert_eq!(record.tags_indexing(), vec!["fiction", "classic"]);
    assert_eq!(record.authors, vec![author]);
    assert_eq!(record.book, book);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tags_follow_attachment_order_not_title(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;
    let tags = seed_tags(&catalog, &["alpha", "beta", "gamma"]).await;

    let book = catalog
        .books
        .create(make_book("111", publisher.uuid).with_tags(vec![tags[2].uuid, tags[0].uuid]))
        .await
        .unwrap();

    let record = catalog.books.get_record(book.uuid).await.unwrap().unwrap();
    assert_eq!(record.tags_indexing(), vec!["gamma", "alpha"]);

    // Kept links keep their place; new ones are appended.
    let changes = make_book("111", publisher.uuid)
        .with_tags(vec![tags[1].uuid, tags[0].uuid]);
    catalog.books.update(book.uuid, changes).await.unwrap();

    let record = catalog.books.get_record(book.uuid).await.unwrap().unwrap();
    assert_eq!(record.tags_indexing(), vec!["alpha", "beta"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_book_without_tags_has_empty_view(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;
    let book = catalog
        .books
        .create(make_book("111", publisher.uuid))
        .await
        .unwrap();

    let records = catalog
        .books
        .get_records(&[book.uuid, Uuid::new_v4()])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].tags_indexing().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_changes_status_and_keeps_id(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;
    let book = catalog
        .books
        .create(make_book("111", publisher.uuid))
        .await
        .unwrap();

    let updated = catalog
        .books
        .update(
            book.uuid,
            make_book("111", publisher.uuid).with_status(BookStatus::Rejected),
        )
        .await
        .unwrap();

    assert_eq!(updated.id, book.id);
    assert_eq!(updated.status, BookStatus::Rejected);
    let state: String = sqlx::query("SELECT state FROM books WHERE uuid = $1")
        .bind(book.uuid)
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("state");
    assert_eq!(state, "rejected");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reverse_lookups(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;
    let tags = seed_tags(&catalog, &["fiction"]).await;
    let author = catalog
        .authors
        .create(NewAuthor::new("Ms", "Ursula K. Le Guin", "ukl@example.com"))
        .await
        .unwrap();

    let first = catalog
        .books
        .create(make_book("111", publisher.uuid).with_tags(vec![tags[0].uuid]))
        .await
        .unwrap();
    let second = catalog
        .books
        .create(make_book("222", publisher.uuid).with_authors(vec![author.uuid]))
        .await
        .unwrap();

    assert_eq!(
        catalog.books.book_uuids_for_publisher(publisher.uuid).await.unwrap(),
        vec![first.uuid, second.uuid]
    );
    assert_eq!(
        catalog.books.book_uuids_for_tag(tags[0].uuid).await.unwrap(),
        vec![first.uuid]
    );
    assert_eq!(
        catalog.books.book_uuids_for_author(author.uuid).await.unwrap(),
        vec![second.uuid]
    );
}

// ============================================================================
// Listing and Search Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_books_list_by_isbn_and_search_title(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;

    for isbn in ["333", "111", "222"] {
        catalog
            .books
            .create(make_book(isbn, publisher.uuid))
            .await
            .unwrap();
    }

    let page = catalog
        .books
        .list(PageRequest::page(1).with_page_size(2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert!(page.has_next());
    assert_eq!(
        page.items.iter().map(|b| b.isbn.as_str()).collect::<Vec<_>>(),
        vec!["111", "222"]
    );

    let found = catalog
        .books
        .search("book 22", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].isbn, "222");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_treats_wildcards_literally(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    seed_tags(&catalog, &["100% cotton", "100 pages"]).await;

    let found = catalog
        .tags
        .search("100%", PageRequest::default())
        .await
        .unwrap();

    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].title, "100% cotton");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_records_loads_relations(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;
    let publisher = seed_publisher(&catalog).await;
    let tags = seed_tags(&catalog, &["fiction"]).await;
    catalog
        .books
        .create(make_book("111", publisher.uuid).with_tags(vec![tags[0].uuid]))
        .await
        .unwrap();

    let page = catalog
        .books
        .list_records(PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].publisher_indexing(), Some("Secker & Warburg"));
    assert_eq!(page.items[0].tags_indexing(), vec!["fiction"]);
}

// ============================================================================
// Example Walkthrough
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_catalog_walkthrough(pool: sqlx::PgPool) {
    let catalog = catalog(&pool).await;

    let p1 = catalog
        .publishers
        .create(make_publisher("P1"))
        .await
        .unwrap();
    assert_eq!(p1.id, 1);

    let tags = seed_tags(&catalog, &["fiction", "classic"]).await;
    let b1 = catalog
        .books
        .create(make_book("111", p1.uuid).with_tags(tags.iter().map(|t| t.uuid).collect()))
        .await
        .unwrap();

    let record = catalog.books.get_record(b1.uuid).await.unwrap().unwrap();
    assert_eq!(record.tags_indexing(), vec!["fiction", "classic"]);
    assert_eq!(record.publisher_indexing(), Some("P1"));

    let duplicate = catalog.books.create(make_book("111", p1.uuid)).await;
    assert!(duplicate.unwrap_err().is_unique_violation());

    let restricted = catalog.publishers.delete(p1.uuid).await;
    assert!(restricted.unwrap_err().is_restrict_violation());
}
