use document_store::{DocumentId, FieldUpdateSet};
use tracing::{info, instrument};

use super::{apply_update, SocialGraph};
use crate::domain::models::{fields, Account, NewPost, Post, PostChanges};
use crate::domain::validation::{require_non_blank, require_non_blank_if_present};
use crate::error::ServiceResult;

impl SocialGraph {
    pub async fn posts(&self) -> ServiceResult<Vec<Post>> {
        self.repository().await?.all().await
    }

    pub async fn post(&self, id: &DocumentId) -> ServiceResult<Option<Post>> {
        self.repository().await?.get(id).await
    }

    /// Insert a post after confirming its author exists
    #[instrument(skip(self, input), fields(author_id = %input.author_id))]
    pub async fn create_post(&self, input: NewPost) -> ServiceResult<Post> {
        require_non_blank("content", &input.content)?;
        require_non_blank("authorId", input.author_id.as_str())?;

        let mut repo = self.repository().await?;
        repo.require::<Account>(&input.author_id).await?;

        let post = repo
            .insert(Post {
                id: DocumentId::default(),
                content: input.content,
                author: input.author_id,
                likes: Vec::new(),
            })
            .await?;

        info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    /// Only `content` is mutable; the author is fixed at creation
    #[instrument(skip(self, changes), fields(post_id = %id))]
    pub async fn update_post(&self, id: &DocumentId, changes: PostChanges) -> ServiceResult<Post> {
        require_non_blank_if_present("content", changes.content.as_deref())?;

        let mut updates = FieldUpdateSet::new();
        if let Some(content) = changes.content {
            updates.set(fields::CONTENT, content);
        }

        let mut repo = self.repository().await?;
        let post = apply_update::<Post>(&mut repo, id, &updates).await?;
        info!(fields = ?updates.field_names(), "Post updated");
        Ok(post)
    }

    /// Unconditional delete; comments and likedPosts entries are not cascaded
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn delete_post(&self, id: &DocumentId) -> ServiceResult<bool> {
        let deleted = self.repository().await?.delete::<Post>(id).await?;
        info!(deleted, "Post delete processed");
        Ok(deleted)
    }
}
