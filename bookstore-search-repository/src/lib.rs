//! # Bookstore Search Repository
//!
//! This crate provides traits and implementations for writing book documents
//! to the search index. It includes definitions for errors, interfaces, and a
//! concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod service;
pub mod types;

pub use config::SearchIndexServiceConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{IndexConfig, OpenSearchProvider};
pub use service::SearchIndexService;
pub use types::{BatchOperationResult, BatchOperationSummary};
