//! Book entity, its publishing status and the loaded record used for indexing.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Author, Publisher, Tag};

/// Default page count for a new book.
pub const DEFAULT_PAGES: i32 = 200;

/// Default stock count for a new book.
pub const DEFAULT_STOCK_COUNT: i32 = 30;

/// Total digits allowed in a price (`NUMERIC(10, 2)`).
pub const PRICE_MAX_DIGITS: u64 = 10;

/// Digits after the decimal point allowed in a price.
pub const PRICE_DECIMAL_PLACES: i64 = 2;

/// Publishing status of a book.
///
/// Any status may change to any other; there are no transition rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    #[default]
    Published,
    NotPublished,
    InProgress,
    Cancelled,
    Rejected,
}

impl BookStatus {
    /// All statuses, in declaration order.
    pub const ALL: [BookStatus; 5] = [
        BookStatus::Published,
        BookStatus::NotPublished,
        BookStatus::InProgress,
        BookStatus::Cancelled,
        BookStatus::Rejected,
    ];

    /// The stored and indexed value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Published => "published",
            BookStatus::NotPublished => "not_published",
            BookStatus::InProgress => "in_progress",
            BookStatus::Cancelled => "cancelled",
            BookStatus::Rejected => "rejected",
        }
    }

    /// Human-readable label shown in the admin.
    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Published => "Published",
            BookStatus::NotPublished => "Not published",
            BookStatus::InProgress => "In progress",
            BookStatus::Cancelled => "Cancelled",
            BookStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known book statuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown book status: {0}")]
pub struct ParseBookStatusError(pub String);

impl FromStr for BookStatus {
    type Err = ParseBookStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseBookStatusError(s.to_string()))
    }
}

/// Field-level problems with a book input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBook {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i32 },

    #[error("price {0} does not fit NUMERIC(10, 2)")]
    PriceOutOfRange(String),
}

/// A book as stored in the relational store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub uuid: Uuid,
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub publisher_uuid: Uuid,
    pub publication_date: NaiveDate,
    pub status: BookStatus,
    pub isbn: String,
    pub price: BigDecimal,
    pub pages: i32,
    pub stock_count: i32,
}

impl Book {
    /// Apply the scalar fields and publisher of `changes`. Relations are
    /// replaced separately by the repository.
    pub fn apply(&mut self, changes: &NewBook) {
        self.title = changes.title.clone();
        self.description = changes.description.clone();
        self.summary = changes.summary.clone();
        self.publisher_uuid = changes.publisher_uuid;
        self.publication_date = changes.publication_date;
        self.status = changes.status;
        self.isbn = changes.isbn.clone();
        self.price = changes.price.clone();
        self.pages = changes.pages;
        self.stock_count = changes.stock_count;
    }
}

/// Input for creating or updating a book, including its many-to-many links.
///
/// `author_uuids` and `tag_uuids` keep the order given; tags are indexed in
/// that order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBook {
    pub uuid: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub publisher_uuid: Uuid,
    pub publication_date: NaiveDate,
    pub status: BookStatus,
    pub isbn: String,
    pub price: BigDecimal,
    pub pages: i32,
    pub stock_count: i32,
    pub author_uuids: Vec<Uuid>,
    pub tag_uuids: Vec<Uuid>,
}

impl NewBook {
    /// Create a book input with the default status, page and stock counts.
    pub fn new(
        title: impl Into<String>,
        isbn: impl Into<String>,
        publisher_uuid: Uuid,
        publication_date: NaiveDate,
        price: BigDecimal,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            description: None,
            summary: None,
            publisher_uuid,
            publication_date,
            status: BookStatus::default(),
            isbn: isbn.into(),
            price,
            pages: DEFAULT_PAGES,
            stock_count: DEFAULT_STOCK_COUNT,
            author_uuids: Vec::new(),
            tag_uuids: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_status(mut self, status: BookStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_authors(mut self, author_uuids: Vec<Uuid>) -> Self {
        self.author_uuids = author_uuids;
        self
    }

    pub fn with_tags(mut self, tag_uuids: Vec<Uuid>) -> Self {
        self.tag_uuids = tag_uuids;
        self
    }

    /// Check the constraints the relational schema cannot express as clearly.
    pub fn validate(&self) -> Result<(), InvalidBook> {
        if self.title.trim().is_empty() {
            return Err(InvalidBook::MissingField("title"));
        }
        if self.isbn.trim().is_empty() {
            return Err(InvalidBook::MissingField("isbn"));
        }
        if self.pages < 0 {
            return Err(InvalidBook::Negative {
                field: "pages",
                value: self.pages,
            });
        }
        if self.stock_count < 0 {
            return Err(InvalidBook::Negative {
                field: "stock_count",
                value: self.stock_count,
            });
        }

        let (_, scale) = self.price.normalized().as_bigint_and_exponent();
        let integer_digits = self.price.with_scale(0).abs().digits();
        if scale > PRICE_DECIMAL_PLACES
            || integer_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES as u64
        {
            return Err(InvalidBook::PriceOutOfRange(self.price.to_string()));
        }

        Ok(())
    }

    /// Materialize the book with its assigned sequential id.
    pub fn to_book(&self, id: i32) -> Book {
        Book {
            uuid: self.uuid,
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            summary: self.summary.clone(),
            publisher_uuid: self.publisher_uuid,
            publication_date: self.publication_date,
            status: self.status,
            isbn: self.isbn.clone(),
            price: self.price.clone(),
            pages: self.pages,
            stock_count: self.stock_count,
        }
    }
}

/// A book loaded together with the related rows its search document needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookRecord {
    pub book: Book,
    pub publisher: Option<Publisher>,
    pub authors: Vec<Author>,
    /// Tags in the order they were attached to the book.
    pub tags: Vec<Tag>,
}

impl BookRecord {
    /// The publisher name as indexed. `None` only when the publisher was not
    /// loaded.
    pub fn publisher_indexing(&self) -> Option<&str> {
        self.publisher.as_ref().map(|p| p.name.as_str())
    }

    /// Tag titles as indexed, in attachment order.
    pub fn tags_indexing(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.title.clone()).collect()
    }
}
