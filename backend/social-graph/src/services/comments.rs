use document_store::{DocumentId, FieldUpdateSet};
use tracing::{info, instrument};

use super::{apply_update, SocialGraph};
use crate::domain::models::{fields, Account, Comment, CommentChanges, NewComment, Post};
use crate::domain::validation::{require_non_blank, require_non_blank_if_present};
use crate::error::ServiceResult;

impl SocialGraph {
    pub async fn comments(&self) -> ServiceResult<Vec<Comment>> {
        self.repository().await?.all().await
    }

    pub async fn comment(&self, id: &DocumentId) -> ServiceResult<Option<Comment>> {
        self.repository().await?.get(id).await
    }

    /// Insert a comment after confirming both its author and post exist
    #[instrument(skip(self, input), fields(author_id = %input.author_id, post_id = %input.post_id))]
    pub async fn create_comment(&self, input: NewComment) -> ServiceResult<Comment> {
        require_non_blank("text", &input.text)?;
        require_non_blank("authorId", input.author_id.as_str())?;
        require_non_blank("postId", input.post_id.as_str())?;

        let mut repo = self.repository().await?;
        repo.require::<Account>(&input.author_id).await?;
        repo.require::<Post>(&input.post_id).await?;

        let comment = repo
            .insert(Comment {
                id: DocumentId::default(),
                text: input.text,
                author: input.author_id,
                post: input.post_id,
            })
            .await?;

        info!(comment_id = %comment.id, "Comment created");
        Ok(comment)
    }

    #[instrument(skip(self, changes), fields(comment_id = %id))]
    pub async fn update_comment(
        &self,
        id: &DocumentId,
        changes: CommentChanges,
    ) -> ServiceResult<Comment> {
        require_non_blank_if_present("text", changes.text.as_deref())?;

        let mut updates = FieldUpdateSet::new();
        if let Some(text) = changes.text {
            updates.set(fields::TEXT, text);
        }

        let mut repo = self.repository().await?;
        let comment = apply_update::<Comment>(&mut repo, id, &updates).await?;
        info!(fields = ?updates.field_names(), "Comment updated");
        Ok(comment)
    }

    #[instrument(skip(self), fields(comment_id = %id))]
    pub async fn delete_comment(&self, id: &DocumentId) -> ServiceResult<bool> {
        let deleted = self.repository().await?.delete::<Comment>(id).await?;
        info!(deleted, "Comment delete processed");
        Ok(deleted)
    }
}
