//! Processor module for the search synchronization pipeline.
//!
//! Resolves catalog change events into book documents and deletions.

mod book_processor;

pub use book_processor::{BookProcessor, ProcessedEvent};
