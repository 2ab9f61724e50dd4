//! Post storage
//!
//! The [`PostStore`] trait is the only way the rest of the crate reaches
//! persisted posts. Two backends implement it:
//!
//! - [`DynamoDbPostStore`]: the production table, one item per post
//! - [`MemoryPostStore`]: a process-local map for tests and local previews
//!
//! Each call is a single request against the backend; there is no retry,
//! batching or caching at this layer.

mod dynamodb;
mod memory;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::{Facet, Post};

pub use dynamodb::{DynamoDbConfig, DynamoDbPostStore};
pub use memory::MemoryPostStore;

/// Errors from post storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// No post with the requested id
    #[error("Post not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached or refused the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored item could not be mapped onto a post
    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },

    /// A post with this id already exists
    #[error("Post already exists: {0}")]
    AlreadyExists(String),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn invalid_item(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Read and administrative write access to the posts table
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// The post with this id
    async fn get_post(&self, id: &str) -> Result<Post>;

    /// Posts whose category or tag list contains `value`, newest first
    async fn list_posts_in(&self, facet: Facet, value: &str) -> Result<Vec<Post>>;

    /// Insert a new post; fails with `AlreadyExists` if the id is taken
    async fn put_post(&self, post: &Post) -> Result<()>;
}
