//! GraphQL schema
//!
//! Object types wrap domain entities; every relationship field is its own
//! async resolver, so the executor resolves sibling fields and list
//! elements concurrently and fetches only what the query selects.

pub mod account;
pub mod comment;
pub mod post;

use async_graphql::{Context, EmptySubscription, MergedObject, Schema, ID};
use document_store::DocumentId;

use crate::services::SocialGraph;

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(account::AccountQuery, post::PostQuery, comment::CommentQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(
    account::AccountMutation,
    post::PostMutation,
    comment::CommentMutation,
);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(graph: SocialGraph) -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(graph)
        .finish()
}

pub(crate) fn social_graph<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a SocialGraph> {
    ctx.data::<SocialGraph>()
        .map_err(|_| "Social graph service not available".into())
}

pub(crate) fn to_document_id(id: ID) -> DocumentId {
    DocumentId::new(id.0)
}

pub(crate) fn to_graphql_id(id: &DocumentId) -> ID {
    ID(id.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    #[test]
    fn test_schema_exposes_query_surface() {
        let (graph, _store) = testing::graph();
        let sdl = build_schema(graph).sdl();

        for field in [
            "accounts: [Account!]!",
            "account(id: ID!): Account",
            "posts: [Post!]!",
            "post(id: ID!): Post",
            "comments: [Comment!]!",
            "comment(id: ID!): Comment",
            "addLike(postId: ID!, accountId: ID!): Post!",
            "removeLike(postId: ID!, accountId: ID!): Post!",
            "deleteAccount(id: ID!): Boolean!",
            "likedPosts: [Post!]!",
        ] {
            assert!(sdl.contains(field), "missing `{field}` in schema");
        }

        let account_type = sdl
            .split("type Account {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .expect("Account type in schema");
        assert!(
            !account_type.contains("password"),
            "credential hash must not be exposed"
        );
    }
}
