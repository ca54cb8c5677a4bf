//! Account schema and resolvers

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result as GraphQLResult, ID};

use super::comment::CommentNode;
use super::post::PostNode;
use super::{social_graph, to_document_id, to_graphql_id};
use crate::domain::models::{Account, AccountChanges, NewAccount};

pub struct AccountNode(pub Account);

#[Object(name = "Account")]
impl AccountNode {
    async fn id(&self) -> ID {
        to_graphql_id(&self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn created_at(&self) -> String {
        self.0.created_at.to_rfc3339()
    }

    async fn updated_at(&self) -> String {
        self.0.updated_at.to_rfc3339()
    }

    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PostNode>> {
        let posts = social_graph(ctx)?
            .account_posts(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(PostNode).collect())
    }

    async fn comments(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<CommentNode>> {
        let comments = social_graph(ctx)?
            .account_comments(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(comments.into_iter().map(CommentNode).collect())
    }

    async fn liked_posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PostNode>> {
        let posts = social_graph(ctx)?
            .account_liked_posts(&self.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(PostNode).collect())
    }
}

#[derive(InputObject)]
pub struct CreateAccountInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl From<CreateAccountInput> for NewAccount {
    fn from(input: CreateAccountInput) -> Self {
        NewAccount {
            name: input.name,
            email: input.email,
            password: input.password,
        }
    }
}

#[derive(InputObject)]
pub struct UpdateAccountInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateAccountInput> for AccountChanges {
    fn from(input: UpdateAccountInput) -> Self {
        AccountChanges {
            name: input.name,
            email: input.email,
            password: input.password,
        }
    }
}

#[derive(Default)]
pub struct AccountQuery;

#[Object]
impl AccountQuery {
    async fn accounts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<AccountNode>> {
        let accounts = social_graph(ctx)?.accounts().await.map_err(|e| e.extend())?;
        Ok(accounts.into_iter().map(AccountNode).collect())
    }

    async fn account(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Option<AccountNode>> {
        let account = social_graph(ctx)?
            .account(&to_document_id(id))
            .await
            .map_err(|e| e.extend())?;
        Ok(account.map(AccountNode))
    }
}

#[derive(Default)]
pub struct AccountMutation;

#[Object]
impl AccountMutation {
    async fn create_account(
        &self,
        ctx: &Context<'_>,
        input: CreateAccountInput,
    ) -> GraphQLResult<AccountNode> {
        let account = social_graph(ctx)?
            .create_account(input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(AccountNode(account))
    }

    async fn update_account(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateAccountInput,
    ) -> GraphQLResult<AccountNode> {
        let account = social_graph(ctx)?
            .update_account(&to_document_id(id), input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(AccountNode(account))
    }

    async fn delete_account(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<bool> {
        social_graph(ctx)?
            .delete_account(&to_document_id(id))
            .await
            .map_err(|e| e.extend())
    }
}
