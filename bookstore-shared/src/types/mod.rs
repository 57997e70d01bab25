//! Catalog entities and the search document derived from them.

pub mod author;
pub mod book;
pub mod book_document;
pub mod publisher;
pub mod tag;

pub use author::{Author, NewAuthor};
pub use book::{Book, BookRecord, BookStatus, InvalidBook, NewBook, ParseBookStatusError};
pub use book_document::BookDocument;
pub use publisher::{GeoPoint, NewPublisher, Publisher};
pub use tag::{NewTag, Tag};
