//! Document store adapter
//!
//! Single-document CRUD keyed by collection name and opaque identifier.
//! The store never offers multi-document transactions: every operation
//! touches exactly one document (or reads a filtered set), and callers that
//! need to keep two documents in step must sequence the writes themselves.
//!
//! Two backends are provided:
//! - [`InMemoryStore`]: process-local, used by tests and local development
//! - [`PgDocumentStore`]: PostgreSQL JSONB table behind a `sqlx` pool
//!
//! Access always goes through a scoped [`StoreSession`] obtained from
//! [`DocumentStore::open_session`]. Dropping the session releases whatever
//! backend resource it holds (a pooled connection for PostgreSQL).

mod error;
mod filter;
mod memory;
mod postgres;

pub use error::{StoreError, StoreResult};
pub use filter::{FieldUpdateSet, Filter};
pub use memory::InMemoryStore;
pub use postgres::{PgDocumentStore, StoreConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field map of a stored document, identifier excluded
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of a document collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collection(&'static str);

impl Collection {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Store-assigned document identifier.
///
/// Opaque to callers: the string form is all that leaves the store, whatever
/// the backend's native key encoding is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
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

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<DocumentId> for serde_json::Value {
    fn from(id: DocumentId) -> Self {
        serde_json::Value::String(id.0)
    }
}

/// A document together with its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

/// Source of scoped store sessions
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Acquire a session. The returned box releases its resource on drop.
    async fn open_session(&self) -> StoreResult<Box<dyn StoreSession>>;
}

/// Single-document operations available within one session
#[async_trait]
pub trait StoreSession: Send {
    /// Insert a document and return it with its newly assigned identifier
    async fn create(
        &mut self,
        collection: Collection,
        body: Document,
    ) -> StoreResult<StoredDocument>;

    /// All documents of a collection, in insertion order
    async fn find_all(&mut self, collection: Collection) -> StoreResult<Vec<StoredDocument>>;

    async fn find_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
    ) -> StoreResult<Option<StoredDocument>>;

    /// Documents matching `filter`, in insertion order
    async fn find_by_filter(
        &mut self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Vec<StoredDocument>>;

    /// Merge `updates` into one document. Returns true iff a document with
    /// this identifier existed and received the update.
    async fn update_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
        updates: &FieldUpdateSet,
    ) -> StoreResult<bool>;

    /// Returns true iff exactly one document was removed
    async fn delete_by_id(&mut self, collection: Collection, id: &DocumentId) -> StoreResult<bool>;
}
