//! # Bookstore Shared
//!
//! This crate defines the bookstore domain model and the pure rules shared by
//! the repository, search and application crates: the sequential identity
//! rule, the admin registration schema, page-based pagination and the
//! projection of a book into its search document.

pub mod admin;
pub mod identity;
pub mod pagination;
pub mod types;

pub use admin::{AdminField, FieldWidget, ModelAdmin};
pub use identity::{next_sequential_id, EntityKind};
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use types::{
    Author, Book, BookDocument, BookRecord, BookStatus, GeoPoint, InvalidBook, NewAuthor, NewBook,
    NewPublisher, NewTag, ParseBookStatusError, Publisher, Tag,
};
