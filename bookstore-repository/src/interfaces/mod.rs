//! This module defines and re-exports the interfaces for the catalog repositories.
//! Each catalog entity has its own repository trait so callers can depend on
//! exactly the persistence they use.
mod authors;
mod books;
mod publishers;
mod tags;

pub use authors::AuthorRepository;
pub use books::BookRepository;
pub use publishers::PublisherRepository;
pub use tags::TagRepository;
