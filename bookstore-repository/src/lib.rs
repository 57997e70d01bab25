//! # Bookstore Repository
//! This crate provides traits and implementations for persisting the
//! bookstore catalog. It includes definitions for errors, interfaces,
//! and concrete implementations for PostgreSQL.
pub mod errors;
pub mod interfaces;
pub mod postgres;

pub use errors::CatalogRepositoryError;
pub use interfaces::{AuthorRepository, BookRepository, PublisherRepository, TagRepository};
pub use postgres::{
    assign_sequential_id, connect, run_migrations, PostgresAuthorRepository,
    PostgresBookRepository, PostgresPublisherRepository, PostgresTagRepository,
    SequentialIdPolicy,
};
