//! In-memory backend behaviour
//!
//! Covers the adapter contract the service layer relies on:
//! - identifiers are assigned on create and are unique
//! - update/delete report whether a document matched
//! - filters evaluate against stored bodies
//! - sessions are released on drop

use document_store::{
    Collection, Document, DocumentId, DocumentStore, FieldUpdateSet, Filter, InMemoryStore,
};
use serde_json::json;

const POSTS: Collection = Collection::new("posts");
const ACCOUNTS: Collection = Collection::new("accounts");

fn body(value: serde_json::Value) -> Document {
    value.as_object().cloned().expect("object literal")
}

#[tokio::test]
async fn test_create_assigns_distinct_ids() {
    let store = InMemoryStore::new();
    let mut session = store.open_session().await.unwrap();

    let first = session
        .create(POSTS, body(json!({ "content": "one" })))
        .await
        .unwrap();
    let second = session
        .create(POSTS, body(json!({ "content": "two" })))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert!(!first.id.as_str().is_empty());

    let all = session.find_all(POSTS).await.unwrap();
    let contents: Vec<_> = all.iter().map(|d| d.body["content"].clone()).collect();
    assert_eq!(contents, vec![json!("one"), json!("two")]);
}

#[tokio::test]
async fn test_collections_are_isolated() {
    let store = InMemoryStore::new();
    let mut session = store.open_session().await.unwrap();

    let post = session
        .create(POSTS, body(json!({ "content": "hi" })))
        .await
        .unwrap();

    assert!(session.find_by_id(ACCOUNTS, &post.id).await.unwrap().is_none());
    assert!(session.find_all(ACCOUNTS).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_reports_match_and_merges_fields() {
    let store = InMemoryStore::new();
    let mut session = store.open_session().await.unwrap();
    let post = session
        .create(POSTS, body(json!({ "content": "hi", "likes": [] })))
        .await
        .unwrap();

    let updates = FieldUpdateSet::new().with("content", "edited");
    assert!(session.update_by_id(POSTS, &post.id, &updates).await.unwrap());

    // same value again still matches
    assert!(session.update_by_id(POSTS, &post.id, &updates).await.unwrap());

    let stored = session.find_by_id(POSTS, &post.id).await.unwrap().unwrap();
    assert_eq!(stored.body["content"], json!("edited"));
    assert_eq!(stored.body["likes"], json!([]));

    let missing = DocumentId::from("missing");
    assert!(!session.update_by_id(POSTS, &missing, &updates).await.unwrap());
}

#[tokio::test]
async fn test_delete_returns_false_for_unknown_id() {
    let store = InMemoryStore::new();
    let mut session = store.open_session().await.unwrap();
    let post = session
        .create(POSTS, body(json!({ "content": "hi" })))
        .await
        .unwrap();

    assert!(session.delete_by_id(POSTS, &post.id).await.unwrap());
    assert!(!session.delete_by_id(POSTS, &post.id).await.unwrap());
    assert!(!session
        .delete_by_id(ACCOUNTS, &DocumentId::from("nope"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_filters_select_matching_documents() {
    let store = InMemoryStore::new();
    let mut session = store.open_session().await.unwrap();
    let a = session
        .create(POSTS, body(json!({ "author": "u1", "likes": ["u2"] })))
        .await
        .unwrap();
    let b = session
        .create(POSTS, body(json!({ "author": "u2", "likes": ["u1", "u2"] })))
        .await
        .unwrap();

    let by_author = session
        .find_by_filter(POSTS, &Filter::field_equals("author", "u1"))
        .await
        .unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].id, a.id);

    let liked_by_u1 = session
        .find_by_filter(POSTS, &Filter::field_contains("likes", "u1"))
        .await
        .unwrap();
    assert_eq!(liked_by_u1.len(), 1);
    assert_eq!(liked_by_u1[0].id, b.id);

    let by_ids = session
        .find_by_filter(POSTS, &Filter::id_in(vec![b.id.clone(), "ghost".into()]))
        .await
        .unwrap();
    assert_eq!(by_ids.len(), 1);
    assert_eq!(by_ids[0].id, b.id);
}

#[tokio::test]
async fn test_sessions_release_on_drop() {
    let store = InMemoryStore::new();
    assert_eq!(store.open_sessions(), 0);

    let first = store.open_session().await.unwrap();
    let second = store.open_session().await.unwrap();
    assert_eq!(store.open_sessions(), 2);

    drop(first);
    assert_eq!(store.open_sessions(), 1);
    drop(second);
    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn test_concurrent_sessions_see_each_others_writes() {
    let store = InMemoryStore::new();

    let writes = (0..8).map(|i| {
        let store = store.clone();
        async move {
            let mut session = store.open_session().await.unwrap();
            session
                .create(POSTS, body(json!({ "content": format!("post {i}") })))
                .await
                .unwrap()
        }
    });
    let created = futures::future::join_all(writes).await;

    assert_eq!(created.len(), 8);
    assert_eq!(store.count(POSTS).await, 8);
    assert_eq!(store.open_sessions(), 0);
}
