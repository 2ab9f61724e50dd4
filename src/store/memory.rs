//! In-memory post store

use super::{PostStore, Result, StoreError};
use crate::content::{sort_newest_first, Facet, Post};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Post store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with posts; later duplicates replace earlier ones
    pub fn with_posts<I>(posts: I) -> Self
    where
        I: IntoIterator<Item = Post>,
    {
        let posts = posts.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            posts: RwLock::new(posts),
        }
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn get_post(&self, id: &str) -> Result<Post> {
        self.posts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn list_posts_in(&self, facet: Facet, value: &str) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.has(facet, value))
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn put_post(&self, post: &Post) -> Result<()> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(StoreError::AlreadyExists(post.id.clone()));
        }
        posts.insert(post.id.clone(), post.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, secs: i64) -> Post {
        let created = Post::timestamp_from_epoch(secs).unwrap();
        Post::new(id.to_string(), id.to_uppercase(), format!("# {}", id), created)
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryPostStore::with_posts(vec![post("a", 100), post("b", 200)]);
        let ids: Vec<_> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let store = MemoryPostStore::new();
        assert!(store.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_post_returns_requested_id() {
        let store = MemoryPostStore::with_posts(vec![post("a", 1), post("b", 2), post("c", 3)]);
        for id in ["a", "b", "c"] {
            assert_eq!(store.get_post(id).await.unwrap().id, id);
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryPostStore::new();
        assert!(matches!(
            store.get_post("missing").await,
            Err(StoreError::NotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_put_does_not_overwrite() {
        let store = MemoryPostStore::new();
        store.put_post(&post("a", 1)).await.unwrap();

        let mut changed = post("a", 99);
        changed.title = "Changed".into();
        assert!(matches!(
            store.put_post(&changed).await,
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(store.get_post("a").await.unwrap().created_epoch(), 1);
    }

    #[tokio::test]
    async fn test_list_posts_in_facet() {
        let mut tagged = post("tagged", 5);
        tagged.tags = vec!["rust".into()];
        let mut older = post("older", 1);
        older.tags = vec!["rust".into(), "web".into()];
        let store = MemoryPostStore::with_posts(vec![tagged, older, post("plain", 9)]);

        let ids: Vec<_> = store
            .list_posts_in(Facet::Tag, "rust")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["tagged", "older"]);
        assert!(store
            .list_posts_in(Facet::Category, "rust")
            .await
            .unwrap()
            .is_empty());
    }
}
