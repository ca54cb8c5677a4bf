//! Typed entity access over one scoped store session
//!
//! A [`Repository`] owns exactly one [`StoreSession`]. It is opened at the
//! start of an orchestrator or field resolver and dropped at the end, which
//! releases the session on every exit path, `?` early returns included.

use document_store::{DocumentId, DocumentStore, FieldUpdateSet, Filter, StoreSession};

use crate::domain::models::Entity;
use crate::error::{ServiceError, ServiceResult};

pub struct Repository {
    session: Box<dyn StoreSession>,
}

impl Repository {
    pub async fn open(store: &dyn DocumentStore) -> ServiceResult<Self> {
        let session = store.open_session().await?;
        Ok(Self { session })
    }

    pub async fn all<T: Entity>(&mut self) -> ServiceResult<Vec<T>> {
        let documents = self.session.find_all(T::COLLECTION).await?;
        documents
            .into_iter()
            .map(|d| T::from_stored(d).map_err(ServiceError::from))
            .collect()
    }

    pub async fn get<T: Entity>(&mut self, id: &DocumentId) -> ServiceResult<Option<T>> {
        self.session
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(T::from_stored)
            .transpose()
            .map_err(ServiceError::from)
    }

    /// Like [`Repository::get`] but absence is a `NotFound` error
    pub async fn require<T: Entity>(&mut self, id: &DocumentId) -> ServiceResult<T> {
        self.get::<T>(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(T::KIND, id))
    }

    pub async fn find<T: Entity>(&mut self, filter: &Filter) -> ServiceResult<Vec<T>> {
        let documents = self.session.find_by_filter(T::COLLECTION, filter).await?;
        documents
            .into_iter()
            .map(|d| T::from_stored(d).map_err(ServiceError::from))
            .collect()
    }

    /// Insert a new entity; the returned copy carries the assigned id
    pub async fn insert<T: Entity>(&mut self, entity: T) -> ServiceResult<T> {
        let stored = self
            .session
            .create(T::COLLECTION, entity.to_document()?)
            .await?;
        Ok(T::from_stored(stored)?)
    }

    pub async fn update<T: Entity>(
        &mut self,
        id: &DocumentId,
        updates: &FieldUpdateSet,
    ) -> ServiceResult<bool> {
        Ok(self.session.update_by_id(T::COLLECTION, id, updates).await?)
    }

    pub async fn delete<T: Entity>(&mut self, id: &DocumentId) -> ServiceResult<bool> {
        Ok(self.session.delete_by_id(T::COLLECTION, id).await?)
    }
}
