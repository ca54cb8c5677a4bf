//! Like and unlike: keep `Post.likes` and `Account.likedPosts` in step
//!
//! Each side is its own document, so the pair is written as two separate
//! single-document updates, post first, then account. Nothing rolls the
//! first write back if the second fails; the failure is logged with both ids
//! and returned. Because adding is set-like, repeating the same Add Like
//! completes a half-written pair.

use document_store::{DocumentId, FieldUpdateSet};
use tracing::{info, instrument, warn};

use super::SocialGraph;
use crate::domain::models::{fields, Account, Entity, Post};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;

impl SocialGraph {
    /// Record that `account_id` likes `post_id`. Idempotent.
    #[instrument(skip(self), fields(post_id = %post_id, account_id = %account_id))]
    pub async fn add_like(
        &self,
        post_id: &DocumentId,
        account_id: &DocumentId,
    ) -> ServiceResult<Post> {
        let mut repo = self.repository().await?;
        let post = repo.require::<Post>(post_id).await?;
        let account = repo.require::<Account>(account_id).await?;

        let likes = with_member(post.likes, account_id);
        write_list::<Post>(&mut repo, post_id, fields::LIKES, &likes).await?;

        let liked_posts = with_member(account.liked_posts, post_id);
        let written =
            write_list::<Account>(&mut repo, account_id, fields::LIKED_POSTS, &liked_posts).await;
        if let Err(e) = written {
            warn!(error = %e, "Like stored on post but not on account; pair is inconsistent");
            return Err(e);
        }

        info!(like_count = likes.len(), "Like added");
        repo.require::<Post>(post_id).await
    }

    /// Remove every occurrence of the like from both sides
    #[instrument(skip(self), fields(post_id = %post_id, account_id = %account_id))]
    pub async fn remove_like(
        &self,
        post_id: &DocumentId,
        account_id: &DocumentId,
    ) -> ServiceResult<Post> {
        let mut repo = self.repository().await?;
        let post = repo.require::<Post>(post_id).await?;
        let account = repo.require::<Account>(account_id).await?;

        let likes = without_member(post.likes, account_id);
        write_list::<Post>(&mut repo, post_id, fields::LIKES, &likes).await?;

        let liked_posts = without_member(account.liked_posts, post_id);
        let written =
            write_list::<Account>(&mut repo, account_id, fields::LIKED_POSTS, &liked_posts).await;
        if let Err(e) = written {
            warn!(error = %e, "Like removed from post but not from account; pair is inconsistent");
            return Err(e);
        }

        info!(like_count = likes.len(), "Like removed");
        repo.require::<Post>(post_id).await
    }
}

/// Replace one id-list field; the target vanishing in between is `NotFound`
async fn write_list<T: Entity>(
    repo: &mut Repository,
    id: &DocumentId,
    field: &'static str,
    ids: &[DocumentId],
) -> ServiceResult<()> {
    let updates = FieldUpdateSet::new().with(field, serde_json::to_value(ids)?);
    if repo.update::<T>(id, &updates).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found(T::KIND, id))
    }
}

fn with_member(mut ids: Vec<DocumentId>, id: &DocumentId) -> Vec<DocumentId> {
    if !ids.contains(id) {
        ids.push(id.clone());
    }
    ids
}

fn without_member(mut ids: Vec<DocumentId>, id: &DocumentId) -> Vec<DocumentId> {
    ids.retain(|existing| existing != id);
    ids
}
