//! In-memory post store - used when neither a database nor a content directory is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use lingua_core::domain::Post;
use lingua_core::error::RepoError;
use lingua_core::ports::{PostRepository, newest_first};

/// Post store backed by a `HashMap` keyed by slug behind an async `RwLock`.
///
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<String, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the store, e.g. from fixtures.
    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let map = posts.into_iter().map(|p| (p.slug.clone(), p)).collect();
        Self {
            posts: RwLock::new(map),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut all: Vec<Post> = posts.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(slug).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.slug) {
            return Err(RepoError::Constraint(format!(
                "slug '{}' is already in use",
                post.slug
            )));
        }
        posts.insert(post.slug.clone(), post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post, expected_version: u64) -> Result<Post, RepoError> {
        // Check and write under one lock so concurrent edits cannot interleave
        let mut posts = self.posts.write().await;
        let stored = posts.get_mut(&post.slug).ok_or(RepoError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepoError::StaleVersion {
                expected: expected_version,
            });
        }
        *stored = post.clone();
        Ok(post)
    }

    async fn delete(&self, slug: &str, expected_version: Option<u64>) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        let stored = posts.get(slug).ok_or(RepoError::NotFound)?;
        if let Some(expected) = expected_version {
            if stored.version != expected {
                return Err(RepoError::StaleVersion { expected });
            }
        }
        posts.remove(slug);
        Ok(())
    }
}
