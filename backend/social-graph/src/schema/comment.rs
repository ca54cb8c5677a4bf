//! Comment schema and resolvers

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result as GraphQLResult, ID};

use super::account::AccountNode;
use super::post::PostNode;
use super::{social_graph, to_document_id, to_graphql_id};
use crate::domain::models::{Comment, CommentChanges, NewComment};

pub struct CommentNode(pub Comment);

#[Object(name = "Comment")]
impl CommentNode {
    async fn id(&self) -> ID {
        to_graphql_id(&self.0.id)
    }

    async fn text(&self) -> &str {
        &self.0.text
    }

    async fn author(&self, ctx: &Context<'_>) -> GraphQLResult<Option<AccountNode>> {
        let author = social_graph(ctx)?
            .comment_author(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(author.map(AccountNode))
    }

    async fn post(&self, ctx: &Context<'_>) -> GraphQLResult<Option<PostNode>> {
        let post = social_graph(ctx)?
            .comment_post(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(post.map(PostNode))
    }
}

#[derive(InputObject)]
pub struct CreateCommentInput {
    pub text: String,
    pub post_id: ID,
    pub author_id: ID,
}

impl From<CreateCommentInput> for NewComment {
    fn from(input: CreateCommentInput) -> Self {
        NewComment {
            text: input.text,
            post_id: to_document_id(input.post_id),
            author_id: to_document_id(input.author_id),
        }
    }
}

#[derive(InputObject)]
pub struct UpdateCommentInput {
    pub text: Option<String>,
}

impl From<UpdateCommentInput> for CommentChanges {
    fn from(input: UpdateCommentInput) -> Self {
        CommentChanges { text: input.text }
    }
}

#[derive(Default)]
pub struct CommentQuery;

#[Object]
impl CommentQuery {
    async fn comments(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<CommentNode>> {
        let comments = social_graph(ctx)?.comments().await.map_err(|e| e.extend())?;
        Ok(comments.into_iter().map(CommentNode).collect())
    }

    async fn comment(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Option<CommentNode>> {
        let comment = social_graph(ctx)?
            .comment(&to_document_id(id))
            .await
            .map_err(|e| e.extend())?;
        Ok(comment.map(CommentNode))
    }
}

#[derive(Default)]
pub struct CommentMutation;

#[Object]
impl CommentMutation {
    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        input: CreateCommentInput,
    ) -> GraphQLResult<CommentNode> {
        let comment = social_graph(ctx)?
            .create_comment(input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(CommentNode(comment))
    }

    async fn update_comment(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateCommentInput,
    ) -> GraphQLResult<CommentNode> {
        let comment = social_graph(ctx)?
            .update_comment(&to_document_id(id), input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(CommentNode(comment))
    }

    async fn delete_comment(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<bool> {
        social_graph(ctx)?
            .delete_comment(&to_document_id(id))
            .await
            .map_err(|e| e.extend())
    }
}
