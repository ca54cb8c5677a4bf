//! Social graph service library
//!
//! Accounts, posts and comments stored as documents, exposed through a
//! GraphQL query graph. Re-exports modules for the binary and tests.

pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod schema;
pub mod security;
pub mod services;

pub use error::{ServiceError, ServiceResult};
pub use schema::{build_schema, AppSchema};
pub use services::SocialGraph;
