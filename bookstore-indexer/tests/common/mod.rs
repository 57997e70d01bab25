//! In-memory doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use bookstore_repository::{
    AuthorRepository, BookRepository, CatalogRepositoryError, PublisherRepository, TagRepository,
};
use bookstore_search_repository::{
    BatchOperationResult, BatchOperationSummary, SearchIndexError, SearchIndexProvider,
};
use bookstore_shared::{
    next_sequential_id, Author, Book, BookDocument, BookRecord, NewAuthor, NewBook, NewPublisher,
    NewTag, Page, PageRequest, Publisher, Tag,
};
use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Default)]
struct CatalogState {
    publishers: Vec<Publisher>,
    authors: Vec<Author>,
    tags: Vec<Tag>,
    books: Vec<Book>,
    book_authors: Vec<(Uuid, Uuid)>,
    book_tags: Vec<(Uuid, Uuid)>,
}

impl CatalogState {
    fn record(&self, book: &Book) -> BookRecord {
        let authors = self
            .book_authors
            .iter()
            .filter(|(b, _)| *b == book.uuid)
            .filter_map(|(_, a)| self.authors.iter().find(|author| author.uuid == *a))
            .cloned()
            .collect();
        let tags = self
            .book_tags
            .iter()
            .filter(|(b, _)| *b == book.uuid)
            .filter_map(|(_, t)| self.tags.iter().find(|tag| tag.uuid == *t))
            .cloned()
            .collect();
        BookRecord {
            book: book.clone(),
            publisher: self
                .publishers
                .iter()
                .find(|p| p.uuid == book.publisher_uuid)
                .cloned(),
            authors,
            tags,
        }
    }

    fn check_references(&self, book: &NewBook) -> Result<(), CatalogRepositoryError> {
        let missing = |constraint: &str| CatalogRepositoryError::MissingReference {
            constraint: constraint.to_string(),
        };
        if !self.publishers.iter().any(|p| p.uuid == book.publisher_uuid) {
            return Err(missing("books_publisher_uuid_fkey"));
        }
        if book
            .author_uuids
            .iter()
            .any(|a| !self.authors.iter().any(|author| author.uuid == *a))
        {
            return Err(missing("book_authors_author_uuid_fkey"));
        }
        if book
            .tag_uuids
            .iter()
            .any(|t| !self.tags.iter().any(|tag| tag.uuid == *t))
        {
            return Err(missing("book_tags_tag_uuid_fkey"));
        }
        Ok(())
    }

    fn replace_links(links: &mut Vec<(Uuid, Uuid)>, book: Uuid, targets: &[Uuid]) {
        links.retain(|(b, t)| *b != book || targets.contains(t));
        for target in targets {
            if !links.contains(&(book, *target)) {
                links.push((book, *target));
            }
        }
    }
}

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let items_on_page = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(items_on_page, page, items.len() as u64)
}

fn contains_term(value: &str, term: &str) -> bool {
    value.to_lowercase().contains(&term.to_lowercase())
}

/// Catalog held in memory, implementing every repository trait.
#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait::async_trait]
impl PublisherRepository for InMemoryCatalog {
    async fn create(&self, publisher: NewPublisher) -> Result<Publisher, CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let id = next_sequential_id(state.publishers.iter().map(|p| p.id).max());
        let publisher = publisher.into_publisher(id);
        state.publishers.push(publisher.clone());
        Ok(publisher)
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Publisher>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.publishers.iter().find(|p| p.uuid == uuid).cloned())
    }

    async fn update(
        &self,
        uuid: Uuid,
        changes: NewPublisher,
    ) -> Result<Publisher, CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let publisher = state
            .publishers
            .iter_mut()
            .find(|p| p.uuid == uuid)
            .ok_or_else(|| CatalogRepositoryError::not_found("publisher", uuid))?;
        publisher.apply(changes);
        Ok(publisher.clone())
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.books.iter().any(|b| b.publisher_uuid == uuid) {
            return Err(CatalogRepositoryError::RestrictViolation {
                constraint: "books_publisher_uuid_fkey".to_string(),
            });
        }
        let before = state.publishers.len();
        state.publishers.retain(|p| p.uuid != uuid);
        if state.publishers.len() == before {
            return Err(CatalogRepositoryError::not_found("publisher", uuid));
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Publisher>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut publishers = state.publishers.clone();
        publishers.sort_by_key(|p| p.id);
        Ok(page_of(&publishers, page))
    }

    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Publisher>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut publishers: Vec<Publisher> = state
            .publishers
            .iter()
            .filter(|p| contains_term(&p.name, term))
            .cloned()
            .collect();
        publishers.sort_by_key(|p| p.id);
        Ok(page_of(&publishers, page))
    }
}

#[async_trait::async_trait]
impl AuthorRepository for InMemoryCatalog {
    async fn create(&self, author: NewAuthor) -> Result<Author, CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let id = next_sequential_id(state.authors.iter().map(|a| a.id).max());
        let author = author.into_author(id);
        state.authors.push(author.clone());
        Ok(author)
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Author>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.authors.iter().find(|a| a.uuid == uuid).cloned())
    }

    async fn update(&self, uuid: Uuid, changes: NewAuthor) -> Result<Author, CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let author = state
            .authors
            .iter_mut()
            .find(|a| a.uuid == uuid)
            .ok_or_else(|| CatalogRepositoryError::not_found("author", uuid))?;
        author.apply(changes);
        Ok(author.clone())
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.authors.len();
        state.authors.retain(|a| a.uuid != uuid);
        if state.authors.len() == before {
            return Err(CatalogRepositoryError::not_found("author", uuid));
        }
        state.book_authors.retain(|(_, a)| *a != uuid);
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Author>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut authors = state.authors.clone();
        authors.sort_by_key(|a| a.id);
        Ok(page_of(&authors, page))
    }

    async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Author>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut authors: Vec<Author> = state
            .authors
            .iter()
            .filter(|a| contains_term(&a.name, term))
            .cloned()
            .collect();
        authors.sort_by_key(|a| a.id);
        Ok(page_of(&authors, page))
    }
}

#[async_trait::async_trait]
impl TagRepository for InMemoryCatalog {
    async fn create(&self, tag: NewTag) -> Result<Tag, CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.tags.iter().any(|t| t.title == tag.title) {
            return Err(CatalogRepositoryError::UniqueViolation {
                constraint: "tags_title_key".to_string(),
            });
        }
        let id = next_sequential_id(state.tags.iter().map(|t| t.id).max());
        let tag = tag.into_tag(id);
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Tag>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.tags.iter().find(|t| t.uuid == uuid).cloned())
    }

    async fn update(&self, uuid: Uuid, changes: NewTag) -> Result<Tag, CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state
            .tags
            .iter()
            .any(|t| t.uuid != uuid && t.title == changes.title)
        {
            return Err(CatalogRepositoryError::UniqueViolation {
                constraint: "tags_title_key".to_string(),
            });
        }
        let tag = state
            .tags
            .iter_mut()
            .find(|t| t.uuid == uuid)
            .ok_or_else(|| CatalogRepositoryError::not_found("tag", uuid))?;
        tag.title = changes.title;
        Ok(tag.clone())
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.tags.len();
        state.tags.retain(|t| t.uuid != uuid);
        if state.tags.len() == before {
            return Err(CatalogRepositoryError::not_found("tag", uuid));
        }
        state.book_tags.retain(|(_, t)| *t != uuid);
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Tag>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut tags = state.tags.clone();
        tags.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(page_of(&tags, page))
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<Tag>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut tags: Vec<Tag> = state
            .tags
            .iter()
            .filter(|t| contains_term(&t.title, term))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(page_of(&tags, page))
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryCatalog {
    async fn create(&self, book: NewBook) -> Result<Book, CatalogRepositoryError> {
        book.validate()
            .map_err(|e| CatalogRepositoryError::validation(e.to_string()))?;
        let mut state = self.state.lock().unwrap();
        if state.books.iter().any(|b| b.isbn == book.isbn) {
            return Err(CatalogRepositoryError::UniqueViolation {
                constraint: "books_isbn_key".to_string(),
            });
        }
        state.check_references(&book)?;

        let id = next_sequential_id(state.books.iter().map(|b| b.id).max());
        let stored = book.to_book(id);
        CatalogState::replace_links(&mut state.book_authors, book.uuid, &book.author_uuids);
        CatalogState::replace_links(&mut state.book_tags, book.uuid, &book.tag_uuids);
        state.books.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Book>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.books.iter().find(|b| b.uuid == uuid).cloned())
    }

    async fn get_record(&self, uuid: Uuid) -> Result<Option<BookRecord>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .books
            .iter()
            .find(|b| b.uuid == uuid)
            .map(|b| state.record(b)))
    }

    async fn get_records(&self, uuids: &[Uuid]) -> Result<Vec<BookRecord>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut books: Vec<&Book> = state
            .books
            .iter()
            .filter(|b| uuids.contains(&b.uuid))
            .collect();
        books.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        Ok(books.into_iter().map(|b| state.record(b)).collect())
    }

    async fn update(&self, uuid: Uuid, changes: NewBook) -> Result<Book, CatalogRepositoryError> {
        changes
            .validate()
            .map_err(|e| CatalogRepositoryError::validation(e.to_string()))?;
        let mut state = self.state.lock().unwrap();
        if state
            .books
            .iter()
            .any(|b| b.uuid != uuid && b.isbn == changes.isbn)
        {
            return Err(CatalogRepositoryError::UniqueViolation {
                constraint: "books_isbn_key".to_string(),
            });
        }
        state.check_references(&changes)?;

        let book = {
            let book = state
                .books
                .iter_mut()
                .find(|b| b.uuid == uuid)
                .ok_or_else(|| CatalogRepositoryError::not_found("book", uuid))?;
            book.apply(&changes);
            book.clone()
        };
        CatalogState::replace_links(&mut state.book_authors, uuid, &changes.author_uuids);
        CatalogState::replace_links(&mut state.book_tags, uuid, &changes.tag_uuids);
        Ok(book)
    }

    async fn delete(&self, uuid: Uuid) -> Result<(), CatalogRepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.books.len();
        state.books.retain(|b| b.uuid != uuid);
        if state.books.len() == before {
            return Err(CatalogRepositoryError::not_found("book", uuid));
        }
        state.book_authors.retain(|(b, _)| *b != uuid);
        state.book_tags.retain(|(b, _)| *b != uuid);
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Book>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut books = state.books.clone();
        books.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        Ok(page_of(&books, page))
    }

    async fn list_records(
        &self,
        page: PageRequest,
    ) -> Result<Page<BookRecord>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut books = state.books.clone();
        books.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        let records: Vec<BookRecord> = books.iter().map(|b| state.record(b)).collect();
        Ok(page_of(&records, page))
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<Book>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut books: Vec<Book> = state
            .books
            .iter()
            .filter(|b| contains_term(&b.title, term))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        Ok(page_of(&books, page))
    }

    async fn book_uuids_for_publisher(
        &self,
        publisher_uuid: Uuid,
    ) -> Result<Vec<Uuid>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        let mut books: Vec<&Book> = state
            .books
            .iter()
            .filter(|b| b.publisher_uuid == publisher_uuid)
            .collect();
        books.sort_by(|a, b| a.isbn.cmp(&b.isbn));
        Ok(books.into_iter().map(|b| b.uuid).collect())
    }

    async fn book_uuids_for_author(
        &self,
        author_uuid: Uuid,
    ) -> Result<Vec<Uuid>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .book_authors
            .iter()
            .filter(|(_, a)| *a == author_uuid)
            .map(|(b, _)| *b)
            .collect())
    }

    async fn book_uuids_for_tag(&self, tag_uuid: Uuid) -> Result<Vec<Uuid>, CatalogRepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .book_tags
            .iter()
            .filter(|(_, t)| *t == tag_uuid)
            .map(|(b, _)| *b)
            .collect())
    }
}

/// Search index held in memory, keyed by book UUID.
#[derive(Default)]
pub struct MockSearchProvider {
    pub documents: Mutex<HashMap<Uuid, BookDocument>>,
    pub deleted: Mutex<Vec<Uuid>>,
    pub index_calls: Mutex<usize>,
    pub should_fail: bool,
}

impl MockSearchProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            should_fail: true,
            ..Self::default()
        })
    }

    pub fn document(&self, uuid: Uuid) -> Option<BookDocument> {
        self.documents.lock().unwrap().get(&uuid).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchIndexProvider for MockSearchProvider {
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn delete_index(&self) -> Result<(), SearchIndexError> {
        self.documents.lock().unwrap().clear();
        Ok(())
    }

    async fn index_document(&self, document: &BookDocument) -> Result<(), SearchIndexError> {
        if self.should_fail {
            return Err(SearchIndexError::write(document.document_id(), "mock failure"));
        }
        *self.index_calls.lock().unwrap() += 1;
        self.documents
            .lock()
            .unwrap()
            .insert(document.uuid, document.clone());
        Ok(())
    }

    async fn delete_document(&self, book_uuid: Uuid) -> Result<(), SearchIndexError> {
        if self.should_fail {
            return Err(SearchIndexError::delete(book_uuid.to_string(), "mock failure"));
        }
        self.documents.lock().unwrap().remove(&book_uuid);
        self.deleted.lock().unwrap().push(book_uuid);
        Ok(())
    }

    async fn bulk_index_documents(
        &self,
        documents: &[BookDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            let id = document.document_id();
            match self.index_document(document).await {
                Ok(()) => results.push(BatchOperationResult::succeeded(id)),
                Err(e) => results.push(BatchOperationResult::failed(id, e)),
            }
        }
        Ok(BatchOperationSummary::from_results(results))
    }

    async fn bulk_delete_documents(
        &self,
        book_uuids: &[Uuid],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut results = Vec::with_capacity(book_uuids.len());
        for uuid in book_uuids {
            match self.delete_document(*uuid).await {
                Ok(()) => results.push(BatchOperationResult::succeeded(uuid.to_string())),
                Err(e) => results.push(BatchOperationResult::failed(uuid.to_string(), e)),
            }
        }
        Ok(BatchOperationSummary::from_results(results))
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn price(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

pub fn new_publisher(name: &str) -> NewPublisher {
    NewPublisher::new(name, "1 Main St", "London", "", "UK", "https://example.com")
}

pub fn new_book(title: &str, isbn: &str, publisher_uuid: Uuid) -> NewBook {
    NewBook::new(title, isbn, publisher_uuid, date(1949, 6, 8), price("12.50"))
}

pub fn catalog_service(
    catalog: &Arc<InMemoryCatalog>,
    sync: bookstore_indexer::SyncHandle,
) -> bookstore_indexer::CatalogService {
    bookstore_indexer::CatalogService::new(
        catalog.clone(),
        catalog.clone(),
        catalog.clone(),
        catalog.clone(),
        sync,
    )
}
