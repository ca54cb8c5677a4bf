//! Relationship field resolvers
//!
//! One method per relationship field. Each takes an already-fetched parent,
//! opens its own session and performs a single store call, so any number of
//! them may run concurrently for sibling fields or list elements.
//! - to-one: point lookup, dangling references resolve to `None`
//! - derived to-many: equality scan on the sibling collection's foreign key
//! - stored to-many: membership scan against an id list

use document_store::Filter;

use super::SocialGraph;
use crate::domain::models::{fields, Account, Comment, Post};
use crate::error::ServiceResult;

impl SocialGraph {
    pub async fn post_author(&self, post: &Post) -> ServiceResult<Option<Account>> {
        self.repository().await?.get(&post.author).await
    }

    pub async fn comment_author(&self, comment: &Comment) -> ServiceResult<Option<Account>> {
        self.repository().await?.get(&comment.author).await
    }

    pub async fn comment_post(&self, comment: &Comment) -> ServiceResult<Option<Post>> {
        self.repository().await?.get(&comment.post).await
    }

    pub async fn account_posts(&self, account: &Account) -> ServiceResult<Vec<Post>> {
        let filter = Filter::field_equals(fields::AUTHOR, account.id.clone());
        self.repository().await?.find(&filter).await
    }

    pub async fn account_comments(&self, account: &Account) -> ServiceResult<Vec<Comment>> {
        let filter = Filter::field_equals(fields::AUTHOR, account.id.clone());
        self.repository().await?.find(&filter).await
    }

    /// Posts whose like list names this account
    pub async fn account_liked_posts(&self, account: &Account) -> ServiceResult<Vec<Post>> {
        let filter = Filter::field_contains(fields::LIKES, account.id.clone());
        self.repository().await?.find(&filter).await
    }

    pub async fn post_comments(&self, post: &Post) -> ServiceResult<Vec<Comment>> {
        let filter = Filter::field_equals(fields::POST, post.id.clone());
        self.repository().await?.find(&filter).await
    }

    /// Accounts listed in the post's like list; deleted likers drop out
    pub async fn post_likes(&self, post: &Post) -> ServiceResult<Vec<Account>> {
        let filter = Filter::id_in(post.likes.iter().cloned());
        self.repository().await?.find(&filter).await
    }
}
