//! Error types for the catalog repository.
//! Consolidates and re-exports error types related to catalog persistence.
mod catalog;

pub use catalog::CatalogRepositoryError;
