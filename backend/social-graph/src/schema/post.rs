//! Post schema, resolvers and like mutations

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result as GraphQLResult, ID};

use super::account::AccountNode;
use super::comment::CommentNode;
use super::{social_graph, to_document_id, to_graphql_id};
use crate::domain::models::{NewPost, Post, PostChanges};

pub struct PostNode(pub Post);

#[Object(name = "Post")]
impl PostNode {
    async fn id(&self) -> ID {
        to_graphql_id(&self.0.id)
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    /// `null` once the author account has been deleted
    async fn author(&self, ctx: &Context<'_>) -> GraphQLResult<Option<AccountNode>> {
        let author = social_graph(ctx)?
            .post_author(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(author.map(AccountNode))
    }

    async fn comments(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<CommentNode>> {
        let comments = social_graph(ctx)?
            .post_comments(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(comments.into_iter().map(CommentNode).collect())
    }

    async fn likes(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<AccountNode>> {
        let likers = social_graph(ctx)?
            .post_likes(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(likers.into_iter().map(AccountNode).collect())
    }
}

#[derive(InputObject)]
pub struct CreatePostInput {
    pub content: String,
    pub author_id: ID,
}

impl From<CreatePostInput> for NewPost {
    fn from(input: CreatePostInput) -> Self {
        NewPost {
            content: input.content,
            author_id: to_document_id(input.author_id),
        }
    }
}

#[derive(InputObject)]
pub struct UpdatePostInput {
    pub content: Option<String>,
}

impl From<UpdatePostInput> for PostChanges {
    fn from(input: UpdatePostInput) -> Self {
        PostChanges {
            content: input.content,
        }
    }
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PostNode>> {
        let posts = social_graph(ctx)?.posts().await.map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(PostNode).collect())
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Option<PostNode>> {
        let post = social_graph(ctx)?
            .post(&to_document_id(id))
            .await
            .map_err(|e| e.extend())?;
        Ok(post.map(PostNode))
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        input: CreatePostInput,
    ) -> GraphQLResult<PostNode> {
        let post = social_graph(ctx)?
            .create_post(input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(PostNode(post))
    }

    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdatePostInput,
    ) -> GraphQLResult<PostNode> {
        let post = social_graph(ctx)?
            .update_post(&to_document_id(id), input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(PostNode(post))
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<bool> {
        social_graph(ctx)?
            .delete_post(&to_document_id(id))
            .await
            .map_err(|e| e.extend())
    }

    async fn add_like(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        account_id: ID,
    ) -> GraphQLResult<PostNode> {
        let post = social_graph(ctx)?
            .add_like(&to_document_id(post_id), &to_document_id(account_id))
            .await
            .map_err(|e| e.extend())?;
        Ok(PostNode(post))
    }

    async fn remove_like(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        account_id: ID,
    ) -> GraphQLResult<PostNode> {
        let post = social_graph(ctx)?
            .remove_like(&to_document_id(post_id), &to_document_id(account_id))
            .await
            .map_err(|e| e.extend())?;
        Ok(PostNode(post))
    }
}
