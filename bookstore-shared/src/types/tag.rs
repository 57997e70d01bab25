//! Tag entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-form label attached to books. Titles are unique across all tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub uuid: Uuid,
    pub id: i32,
    pub title: String,
}

/// Input for creating a tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTag {
    pub uuid: Uuid,
    pub title: String,
}

impl NewTag {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
        }
    }

    pub fn into_tag(self, id: i32) -> Tag {
        Tag {
            uuid: self.uuid,
            id,
            title: self.title,
        }
    }
}
