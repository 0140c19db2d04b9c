use async_trait::async_trait;

use crate::domain::Post;
use crate::error::RepoError;

/// Durable storage for posts, keyed by slug.
///
/// Every call goes to the backing store; there is no caching layer.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Every post, newest first (`date` descending, then id ascending).
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Exact slug lookup.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self.find_by_slug(slug).await?.is_some())
    }

    /// Persist a new post. Fails with `RepoError::Constraint` if the slug is taken.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// Replace the stored post with the same slug, provided it is still at `expected_version`.
    async fn update(&self, post: Post, expected_version: u64) -> Result<Post, RepoError>;

    /// Remove a post. With `expected_version`, only if the stored post is still at that version.
    async fn delete(&self, slug: &str, expected_version: Option<u64>) -> Result<(), RepoError>;
}

/// Order used by `find_all` implementations that sort in memory.
pub fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}
