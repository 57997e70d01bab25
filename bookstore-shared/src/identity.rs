//! Sequential identity rule shared by every catalog entity.
//!
//! Each entity has a UUID primary key generated at construction time and a
//! sequential integer `id` assigned when the row is first saved. The counter
//! is a display value: it is derived from the current maximum and carries no
//! uniqueness guarantee of its own.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The catalog entity types that carry a sequential id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Publisher,
    Author,
    Tag,
    Book,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Publisher,
        EntityKind::Author,
        EntityKind::Tag,
        EntityKind::Book,
    ];

    /// Table holding rows of this kind.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Publisher => "publishers",
            EntityKind::Author => "authors",
            EntityKind::Tag => "tags",
            EntityKind::Book => "books",
        }
    }

    /// Stable key used to serialize counter assignment for this kind.
    pub fn lock_key(&self) -> i64 {
        // "bkst" in ASCII, followed by the kind discriminant.
        const NAMESPACE: i64 = 0x626b_7374 << 8;
        NAMESPACE
            + match self {
                EntityKind::Publisher => 1,
                EntityKind::Author => 2,
                EntityKind::Tag => 3,
                EntityKind::Book => 4,
            }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Publisher => "publisher",
            EntityKind::Author => "author",
            EntityKind::Tag => "tag",
            EntityKind::Book => "book",
        };
        f.write_str(name)
    }
}

/// Next sequential id given the current maximum of the same entity type.
///
/// Returns `1` when no rows exist yet.
///
/// ```
/// use bookstore_shared::next_sequential_id;
///
/// assert_eq!(next_sequential_id(None), 1);
/// assert_eq!(next_sequential_id(Some(41)), 42);
/// ```
pub fn next_sequential_id(current_max: Option<i32>) -> i32 {
    match current_max {
        Some(max) => max.saturating_add(1),
        None => 1,
    }
}
