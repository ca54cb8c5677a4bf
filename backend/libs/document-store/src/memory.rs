//! Process-local document store
//!
//! Collections are kept as insertion-ordered vectors behind a tokio `RwLock`.
//! Every operation takes the lock for exactly one call, matching the
//! one-document atomicity of the real backends.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;
use uuid::Uuid;

use crate::{
    Collection, Document, DocumentId, DocumentStore, FieldUpdateSet, Filter, StoreResult,
    StoreSession, StoredDocument,
};

#[derive(Default)]
struct Inner {
    collections: RwLock<HashMap<&'static str, Vec<StoredDocument>>>,
    open_sessions: AtomicUsize,
}

/// In-memory backend. Cloning shares the underlying data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions acquired and not yet dropped
    pub fn open_sessions(&self) -> usize {
        self.inner.open_sessions.load(Ordering::SeqCst)
    }

    /// Copy of a whole collection, in insertion order
    pub async fn snapshot(&self, collection: Collection) -> Vec<StoredDocument> {
        self.inner
            .collections
            .read()
            .await
            .get(collection.as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub async fn count(&self, collection: Collection) -> usize {
        self.inner
            .collections
            .read()
            .await
            .get(collection.as_str())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn open_session(&self) -> StoreResult<Box<dyn StoreSession>> {
        let open = self.inner.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(open_sessions = open, "memory session opened");
        Ok(Box::new(MemorySession {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct MemorySession {
    inner: Arc<Inner>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        let open = self.inner.open_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!(open_sessions = open, "memory session released");
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn create(
        &mut self,
        collection: Collection,
        body: Document,
    ) -> StoreResult<StoredDocument> {
        let document = StoredDocument {
            id: DocumentId::new(Uuid::new_v4().to_string()),
            body,
        };
        self.inner
            .collections
            .write()
            .await
            .entry(collection.as_str())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn find_all(&mut self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn find_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
    ) -> StoreResult<Option<StoredDocument>> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .and_then(|documents| documents.iter().find(|d| &d.id == id))
            .cloned())
    }

    async fn find_by_filter(
        &mut self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| filter.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
        updates: &FieldUpdateSet,
    ) -> StoreResult<bool> {
        let mut collections = self.inner.collections.write().await;
        let target = collections
            .get_mut(collection.as_str())
            .and_then(|documents| documents.iter_mut().find(|d| &d.id == id));

        match target {
            Some(document) => {
                updates.apply_to(&mut document.body);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&mut self, collection: Collection, id: &DocumentId) -> StoreResult<bool> {
        let mut collections = self.inner.collections.write().await;
        let Some(documents) = collections.get_mut(collection.as_str()) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|d| &d.id != id);
        Ok(documents.len() < before)
    }
}
