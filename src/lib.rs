//! dynablog: a small personal blog served from a DynamoDB table
//!
//! Posts are stored one item per post, rendered from Markdown (with
//! tables and syntax-highlighted code) and served as HTML by an axum app.

pub mod commands;
pub mod config;
pub mod content;
pub mod server;
pub mod store;
pub mod templates;

use anyhow::Result;
use std::sync::Arc;

/// The blog application: configuration plus the store it reads from
#[derive(Clone)]
pub struct Blog {
    /// Blog configuration
    pub config: config::BlogConfig,
    /// Post storage
    pub store: Arc<dyn store::PostStore>,
}

impl Blog {
    /// Create a blog backed by the configured DynamoDB table
    pub async fn connect(config: config::BlogConfig) -> Result<Self> {
        let store = store::DynamoDbPostStore::from_blog_config(&config).await;
        tracing::info!("Using DynamoDB table {}", store.table_name());
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Create a blog backed by an empty in-memory store
    pub fn in_memory(config: config::BlogConfig) -> Self {
        Self {
            config,
            store: Arc::new(store::MemoryPostStore::new()),
        }
    }

    /// Build the shared request state
    pub fn app_state(&self) -> Result<server::AppState> {
        server::AppState::new(self.config.clone(), Arc::clone(&self.store))
    }

    /// Start serving HTTP
    pub async fn serve(&self, ip: &str, port: u16) -> Result<()> {
        let state = Arc::new(self.app_state()?);
        server::start(state, ip, port).await
    }
}
