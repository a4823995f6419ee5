use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);

/// Identifier the content store assigns to a created document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The named form fields. The markdown pitch body is tracked separately
/// because the editor is a controlled widget outside form serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchFields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PitchDraft {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 500, message = "Description must be 1 to 500 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 20, message = "Category must be 1 to 20 characters"))]
    pub category: String,
    #[validate(url(message = "Link must be a valid URL"))]
    pub link: String,
    #[validate(length(min = 10, message = "Pitch must be at least 10 characters"))]
    pub pitch: String,
}

impl PitchDraft {
    pub fn from_parts(fields: PitchFields, pitch: impl Into<String>) -> Self {
        Self {
            title: fields.title,
            description: fields.description,
            category: fields.category,
            link: fields.link,
            pitch: pitch.into(),
        }
    }

    pub fn fields(&self) -> PitchFields {
        PitchFields {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            link: self.link.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "startup")]
    Startup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlugType {
    #[serde(rename = "slug")]
    Slug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceType {
    #[serde(rename = "reference")]
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(rename = "_type")]
    pub kind: SlugType,
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            kind: SlugType::Slug,
            current: current.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    #[serde(rename = "_type")]
    pub kind: ReferenceType,
    #[serde(rename = "_ref")]
    pub target: String,
}

impl AuthorRef {
    pub fn user(user_id: UserId) -> Self {
        Self {
            kind: ReferenceType::Reference,
            target: user_id.to_string(),
        }
    }
}

/// Document shape written to the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchDocument {
    #[serde(rename = "_type")]
    pub kind: DocumentType,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub slug: Slug,
    pub author: AuthorRef,
    pub pitch: String,
}

/// A document as returned by the store, with its generated fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStartup {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub document: PitchDocument,
}
