//! Author entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub uuid: Uuid,
    pub id: i32,
    pub salutation: String,
    pub name: String,
    pub email: String,
    /// Storage key of the avatar image (e.g. `author/jane.png`), resolved to a
    /// URL by the media storage configuration.
    pub avatar: Option<String>,
}

impl Author {
    pub fn apply(&mut self, changes: NewAuthor) {
        self.salutation = changes.salutation;
        self.name = changes.name;
        self.email = changes.email;
        self.avatar = changes.avatar;
    }
}

/// Input for creating or updating an author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAuthor {
    pub uuid: Uuid,
    pub salutation: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl NewAuthor {
    pub fn new(
        salutation: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            salutation: salutation.into(),
            name: name.into(),
            email: email.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, key: impl Into<String>) -> Self {
        self.avatar = Some(key.into());
        self
    }

    pub fn into_author(self, id: i32) -> Author {
        Author {
            uuid: self.uuid,
            id,
            salutation: self.salutation,
            name: self.name,
            email: self.email,
            avatar: self.avatar,
        }
    }
}
