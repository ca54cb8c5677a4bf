//! Like/unlike consistency between `Post.likes` and `Account.likedPosts`
//!
//! Test Coverage:
//! - a failing account write leaves the post side written (no rollback)
//! - repeating Add Like after the failure repairs the pair
//! - sibling reads resolve concurrently on independent sessions

use async_trait::async_trait;
use document_store::{
    Collection, Document, DocumentId, DocumentStore, FieldUpdateSet, Filter, InMemoryStore,
    StoreError, StoreResult, StoreSession, StoredDocument,
};
use social_graph::domain::models::{NewAccount, NewPost, ACCOUNTS};
use social_graph::security::{CredentialHasher, HashingConfig};
use social_graph::{ServiceError, SocialGraph};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Delegates to an in-memory store, optionally failing account updates
#[derive(Clone)]
struct FlakyStore {
    inner: InMemoryStore,
    fail_account_updates: Arc<AtomicBool>,
}

struct FlakySession {
    inner: Box<dyn StoreSession>,
    fail_account_updates: Arc<AtomicBool>,
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn open_session(&self) -> StoreResult<Box<dyn StoreSession>> {
        Ok(Box::new(FlakySession {
            inner: self.inner.open_session().await?,
            fail_account_updates: self.fail_account_updates.clone(),
        }))
    }
}

#[async_trait]
impl StoreSession for FlakySession {
    async fn create(
        &mut self,
        collection: Collection,
        body: Document,
    ) -> StoreResult<StoredDocument> {
        self.inner.create(collection, body).await
    }

    async fn find_all(&mut self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        self.inner.find_all(collection).await
    }

    async fn find_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
    ) -> StoreResult<Option<StoredDocument>> {
        self.inner.find_by_id(collection, id).await
    }

    async fn find_by_filter(
        &mut self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Vec<StoredDocument>> {
        self.inner.find_by_filter(collection, filter).await
    }

    async fn update_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
        updates: &FieldUpdateSet,
    ) -> StoreResult<bool> {
        if collection == ACCOUNTS && self.fail_account_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected account write failure".into()));
        }
        self.inner.update_by_id(collection, id, updates).await
    }

    async fn delete_by_id(&mut self, collection: Collection, id: &DocumentId) -> StoreResult<bool> {
        self.inner.delete_by_id(collection, id).await
    }
}

fn flaky_graph() -> (SocialGraph, InMemoryStore, Arc<AtomicBool>) {
    let inner = InMemoryStore::new();
    let fail = Arc::new(AtomicBool::new(false));
    let store = FlakyStore {
        inner: inner.clone(),
        fail_account_updates: fail.clone(),
    };
    let hasher = CredentialHasher::new(HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    (SocialGraph::new(Arc::new(store), hasher), inner, fail)
}

async fn seed(graph: &SocialGraph, email: &str) -> (DocumentId, DocumentId) {
    let account = graph
        .create_account(NewAccount {
            name: "A".into(),
            email: email.into(),
            password: "p".into(),
        })
        .await
        .unwrap();
    let post = graph
        .create_post(NewPost {
            content: "hi".into(),
            author_id: account.id.clone(),
        })
        .await
        .unwrap();
    (account.id, post.id)
}

#[tokio::test]
async fn test_failed_account_write_leaves_post_side_and_retry_repairs() {
    let (graph, store, fail) = flaky_graph();
    let (account_id, post_id) = seed(&graph, "a@x.com").await;

    fail.store(true, Ordering::SeqCst);
    let err = graph.add_like(&post_id, &account_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::Unavailable(_))));
    assert_eq!(err.code(), "STORE_ERROR");

    // post write landed, account write did not
    let post = graph.post(&post_id).await.unwrap().unwrap();
    assert_eq!(post.likes, vec![account_id.clone()]);
    let account = graph.account(&account_id).await.unwrap().unwrap();
    assert!(account.liked_posts.is_empty());

    fail.store(false, Ordering::SeqCst);
    let repaired = graph.add_like(&post_id, &account_id).await.unwrap();
    assert_eq!(repaired.likes, vec![account_id.clone()]);
    let account = graph.account(&account_id).await.unwrap().unwrap();
    assert_eq!(account.liked_posts, vec![post_id]);

    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn test_failed_unlike_is_repaired_by_repeating_it() {
    let (graph, store, fail) = flaky_graph();
    let (account_id, post_id) = seed(&graph, "a@x.com").await;
    graph.add_like(&post_id, &account_id).await.unwrap();

    fail.store(true, Ordering::SeqCst);
    assert!(graph.remove_like(&post_id, &account_id).await.is_err());

    let post = graph.post(&post_id).await.unwrap().unwrap();
    assert!(post.likes.is_empty());
    let account = graph.account(&account_id).await.unwrap().unwrap();
    assert_eq!(account.liked_posts, vec![post_id.clone()]);

    fail.store(false, Ordering::SeqCst);
    graph.remove_like(&post_id, &account_id).await.unwrap();
    let account = graph.account(&account_id).await.unwrap().unwrap();
    assert!(account.liked_posts.is_empty());

    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn test_likes_from_many_accounts_on_separate_posts() {
    let (graph, store, _fail) = flaky_graph();

    let mut pairs = Vec::new();
    for n in 0..8 {
        pairs.push(seed(&graph, &format!("user{n}@x.com")).await);
    }

    let likes = pairs
        .iter()
        .map(|(account_id, post_id)| graph.add_like(post_id, account_id));
    let results = futures::future::join_all(likes).await;
    assert!(results.iter().all(Result::is_ok));

    for (account_id, post_id) in &pairs {
        let account = graph.account(account_id).await.unwrap().unwrap();
        assert_eq!(&account.liked_posts, &vec![post_id.clone()]);
        let liked_posts = graph.account_liked_posts(&account).await.unwrap();
        assert_eq!(liked_posts.len(), 1);
        assert_eq!(&liked_posts[0].id, post_id);
    }

    assert_eq!(store.open_sessions(), 0);
}
