use chrono::{DateTime, Utc};
use document_store::{Collection, Document, DocumentId, StoredDocument};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ACCOUNTS: Collection = Collection::new("accounts");
pub const POSTS: Collection = Collection::new("posts");
pub const COMMENTS: Collection = Collection::new("comments");

/// Stored field names, shared by filters and partial updates
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const LIKED_POSTS: &str = "likedPosts";
    pub const UPDATED_AT: &str = "updatedAt";
    pub const CONTENT: &str = "content";
    pub const AUTHOR: &str = "author";
    pub const LIKES: &str = "likes";
    pub const TEXT: &str = "text";
    pub const POST: &str = "post";
}

/// A persisted entity type: knows its collection and converts to and from
/// the store's document representation.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    const COLLECTION: Collection;
    /// Human-readable name used in error messages
    const KIND: &'static str;

    fn set_id(&mut self, id: DocumentId);

    fn from_stored(stored: StoredDocument) -> Result<Self, serde_json::Error> {
        let mut entity: Self = serde_json::from_value(Value::Object(stored.body))?;
        entity.set_id(stored.id);
        Ok(entity)
    }

    fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(<serde_json::Error as serde::ser::Error>::custom(
                "entity did not serialize to an object",
            )),
        }
    }
}

/// Account entity. Authored posts and comments are derived from the sibling
/// collections and are not stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(skip)]
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; never leaves the service
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub liked_posts: Vec<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Account {
    const COLLECTION: Collection = ACCOUNTS;
    const KIND: &'static str = "Account";

    fn set_id(&mut self, id: DocumentId) {
        self.id = id;
    }
}

/// Post entity. `author` is fixed at creation; `likes` mirrors
/// `Account::liked_posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(skip)]
    pub id: DocumentId,
    pub content: String,
    pub author: DocumentId,
    #[serde(default)]
    pub likes: Vec<DocumentId>,
}

impl Entity for Post {
    const COLLECTION: Collection = POSTS;
    const KIND: &'static str = "Post";

    fn set_id(&mut self, id: DocumentId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(skip)]
    pub id: DocumentId,
    pub text: String,
    pub author: DocumentId,
    pub post: DocumentId,
}

impl Entity for Comment {
    const COLLECTION: Collection = COMMENTS;
    const KIND: &'static str = "Comment";

    fn set_id(&mut self, id: DocumentId) {
        self.id = id;
    }
}

// ============================================================================
// Mutation inputs
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Optional account fields; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub author_id: DocumentId,
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub post_id: DocumentId,
    pub author_id: DocumentId,
}

#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub text: Option<String>,
}
