//! Mutation orchestrators and relationship resolvers
//!
//! Every public operation opens its own [`Repository`] (one store session)
//! and runs its store calls strictly in sequence. There is no wrapping
//! transaction: a failure part-way leaves earlier writes in place.

mod accounts;
mod comments;
mod likes;
mod posts;
mod relations;

use document_store::{DocumentId, DocumentStore, FieldUpdateSet};
use std::sync::Arc;

use crate::domain::models::Entity;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;
use crate::security::CredentialHasher;

/// Entry point for all reads and writes against the social graph
#[derive(Clone)]
pub struct SocialGraph {
    store: Arc<dyn DocumentStore>,
    hasher: CredentialHasher,
}

impl SocialGraph {
    pub fn new(store: Arc<dyn DocumentStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    async fn repository(&self) -> ServiceResult<Repository> {
        Repository::open(self.store.as_ref()).await
    }
}

/// Apply a partial update and return the entity as stored afterwards.
///
/// An empty update set performs no write; the target is only re-fetched.
/// Either way a missing target is `NotFound`.
async fn apply_update<T: Entity>(
    repo: &mut Repository,
    id: &DocumentId,
    updates: &FieldUpdateSet,
) -> ServiceResult<T> {
    if !updates.is_empty() && !repo.update::<T>(id, updates).await? {
        return Err(ServiceError::not_found(T::KIND, id));
    }
    repo.require::<T>(id).await
}

#[cfg(test)]
pub(crate) mod testing {
    use document_store::InMemoryStore;
    use std::sync::Arc;

    use super::SocialGraph;
    use crate::domain::models::{Account, NewAccount, NewPost, Post};
    use crate::security::{CredentialHasher, HashingConfig};

    pub fn graph() -> (SocialGraph, InMemoryStore) {
        let store = InMemoryStore::new();
        let hasher = CredentialHasher::new(HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("valid test hashing cost");
        (SocialGraph::new(Arc::new(store.clone()), hasher), store)
    }

    pub async fn account(graph: &SocialGraph, email: &str) -> Account {
        graph
            .create_account(NewAccount {
                name: "A".into(),
                email: email.into(),
                password: "p".into(),
            })
            .await
            .expect("account created")
    }

    pub async fn post(graph: &SocialGraph, author: &Account, content: &str) -> Post {
        graph
            .create_post(NewPost {
                content: content.into(),
                author_id: author.id.clone(),
            })
            .await
            .expect("post created")
    }
}
