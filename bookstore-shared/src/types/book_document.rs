//! Book document types for the search index.
//!
//! This module defines the denormalized document a book is projected into
//! before it is written to the search engine.

use bigdecimal::ToPrimitive;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookRecord;

/// Document representation of a book in the search index.
///
/// The JSON keys are the index field names and must not change without a new
/// index version. `publisher` and `tags` are derived through the book's
/// relations; everything else is copied from the book row.
///
/// # Fields
///
/// - `id`: Sequential display id of the book
/// - `title`, `description`, `summary`, `isbn`: Analyzed text fields
/// - `state`: Publishing status value (e.g. `published`)
/// - `publisher`: Name of the book's publisher
/// - `publication_date`: Date of publication
/// - `price`: Price as a floating point number
/// - `pages`, `stock_count`: Integer counts
/// - `tags`: Tag titles in attachment order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDocument {
    /// Primary key of the book; used as the index document id, not stored in
    /// the source document.
    #[serde(skip)]
    pub uuid: Uuid,
    pub id: i32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub publication_date: NaiveDate,
    pub state: String,
    pub isbn: String,
    pub price: f64,
    pub pages: i32,
    pub stock_count: i32,
    pub tags: Vec<String>,
}

impl BookDocument {
    /// Project a loaded book into its search document.
    ///
    /// The projection is pure: the same record always yields the same
    /// document, and therefore the same serialized bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use bookstore_shared::{BookDocument, BookRecord, NewBook, NewPublisher, NewTag};
    /// use bigdecimal::BigDecimal;
    /// use chrono::NaiveDate;
    ///
    /// let publisher = NewPublisher::new("P1", "", "", "", "", "").into_publisher(1);
    /// let book = NewBook::new(
    ///     "B1",
    ///     "111",
    ///     publisher.uuid,
    ///     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    ///     BigDecimal::from(10),
    /// );
    /// let record = BookRecord {
    ///     book: book.to_book(1),
    ///     publisher: Some(publisher),
    ///     authors: vec![],
    ///     tags: vec![NewTag::new("fiction").into_tag(1)],
    /// };
    ///
    /// let doc = BookDocument::from_record(&record);
    /// assert_eq!(doc.publisher.as_deref(), Some("P1"));
    /// assert_eq!(doc.tags, vec!["fiction"]);
    /// ```
    pub fn from_record(record: &BookRecord) -> Self {
        let book = &record.book;
        Self {
            uuid: book.uuid,
            id: book.id,
            title: book.title.clone(),
            description: book.description.clone(),
            summary: book.summary.clone(),
            publisher: record.publisher_indexing().map(str::to_string),
            publication_date: book.publication_date,
            state: book.status.as_str().to_string(),
            isbn: book.isbn.clone(),
            price: book.price.to_f64().unwrap_or_default(),
            pages: book.pages,
            stock_count: book.stock_count,
            tags: record.tags_indexing(),
        }
    }

    /// Generate the document ID used in the search index.
    pub fn document_id(&self) -> String {
        self.uuid.to_string()
    }
}
