//! Blog facade - the single entry point used by HTTP handlers.
//!
//! Composes the post store, the renderer and the search engine, and gates
//! mutations behind the admin role. Markdown is rendered here, once, right
//! before a post leaves the facade.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    AuthContext, FacetCount, NewPost, Post, PostPatch, RenderedPost, SearchQuery, SearchResult,
    slugify,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{ContentRenderer, PostRepository};
use crate::search;
use crate::seo::{self, DESCRIPTION_LEN, PostSeo};

const MAX_SLUG_SUFFIX: u32 = 1000;
const FALLBACK_AUTHOR: &str = "admin";

#[derive(Clone)]
pub struct BlogService {
    repo: Arc<dyn PostRepository>,
    renderer: Arc<dyn ContentRenderer>,
}

impl BlogService {
    pub fn new(repo: Arc<dyn PostRepository>, renderer: Arc<dyn ContentRenderer>) -> Self {
        Self { repo, renderer }
    }

    /// Filter, sort and paginate over every stored post.
    pub async fn search_posts(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResult<RenderedPost>, DomainError> {
        query.validate()?;
        let posts = self.load_all().await?;
        let result = search::run(posts, query)?;
        Ok(result.map(|p| self.render(p)))
    }

    pub async fn get_post(&self, slug: &str) -> Result<RenderedPost, DomainError> {
        let post = self.fetch(slug).await?;
        Ok(self.render(post))
    }

    pub async fn create_post(
        &self,
        input: NewPost,
        auth: &AuthContext,
    ) -> Result<RenderedPost, DomainError> {
        require_admin(auth, "create")?;
        input.validate()?;

        let slug = match input.slug.clone() {
            Some(slug) => {
                if self.slug_taken(&slug).await? {
                    return Err(DomainError::Conflict(format!(
                        "slug '{}' is already in use",
                        slug
                    )));
                }
                slug
            }
            None => self.derive_slug(&input.title).await?,
        };

        let excerpt = match input.excerpt.as_deref().map(str::trim) {
            Some(excerpt) if !excerpt.is_empty() => excerpt.to_string(),
            _ => self.auto_excerpt(&input.content),
        };
        let author = input
            .author
            .clone()
            .filter(|a| !a.trim().is_empty())
            .or_else(|| auth.subject.clone())
            .unwrap_or_else(|| FALLBACK_AUTHOR.to_string());

        let post = Post::create(input, slug.clone(), excerpt, author, Utc::now());
        let saved = self
            .repo
            .insert(post)
            .await
            .map_err(|e| repo_failure("create", &slug, e))?;

        tracing::info!(slug = %saved.slug, status = %saved.status, "Post created");
        Ok(self.render(saved))
    }

    pub async fn update_post(
        &self,
        slug: &str,
        patch: PostPatch,
        auth: &AuthContext,
    ) -> Result<RenderedPost, DomainError> {
        require_admin(auth, "update")?;
        if patch.is_empty() {
            return Err(DomainError::Validation("update contains no changes".into()));
        }

        let mut post = self.fetch(slug).await?;
        let expected = check_version(&post, patch.expected_version)?;

        post.apply(patch, Utc::now())?;
        if post.excerpt.trim().is_empty() {
            post.excerpt = self.auto_excerpt(&post.content);
        }

        let saved = self
            .repo
            .update(post, expected)
            .await
            .map_err(|e| repo_failure("update", slug, e))?;

        tracing::info!(slug = %saved.slug, version = saved.version, "Post updated");
        Ok(self.render(saved))
    }

    /// Move a draft to published. Publishing a published post changes nothing.
    pub async fn publish_post(
        &self,
        slug: &str,
        expected_version: Option<u64>,
        auth: &AuthContext,
    ) -> Result<RenderedPost, DomainError> {
        require_admin(auth, "publish")?;

        let mut post = self.fetch(slug).await?;
        let expected = check_version(&post, expected_version)?;
        if post.is_published() {
            return Ok(self.render(post));
        }

        let now = Utc::now();
        post.publish(now);
        post.touch(now);

        let saved = self
            .repo
            .update(post, expected)
            .await
            .map_err(|e| repo_failure("publish", slug, e))?;

        tracing::info!(slug = %saved.slug, "Post published");
        Ok(self.render(saved))
    }

    /// Remove a post permanently.
    pub async fn delete_post(
        &self,
        slug: &str,
        expected_version: Option<u64>,
        auth: &AuthContext,
    ) -> Result<(), DomainError> {
        require_admin(auth, "delete")?;

        self.repo
            .delete(slug, expected_version)
            .await
            .map_err(|e| repo_failure("delete", slug, e))?;

        tracing::info!(slug = %slug, "Post deleted");
        Ok(())
    }

    /// Render draft markdown without storing anything.
    pub async fn preview_content(
        &self,
        markdown: &str,
        auth: &AuthContext,
    ) -> Result<String, DomainError> {
        require_admin(auth, "preview")?;
        Ok(self.renderer.render(markdown))
    }

    /// Category counts. Drafts only count for admins.
    pub async fn categories(&self, auth: &AuthContext) -> Result<Vec<FacetCount>, DomainError> {
        let posts = self.visible_to(auth).await?;
        Ok(search::categories(&posts))
    }

    /// Tag counts. Drafts only count for admins.
    pub async fn tags(&self, auth: &AuthContext) -> Result<Vec<FacetCount>, DomainError> {
        let posts = self.visible_to(auth).await?;
        Ok(search::tags(&posts))
    }

    pub fn seo(&self, post: &RenderedPost, site_url: &str, site_name: &str) -> PostSeo {
        seo::for_post(post, site_url, site_name)
    }

    fn render(&self, post: Post) -> RenderedPost {
        let html = self.renderer.render(&post.content);
        RenderedPost { post, html }
    }

    fn auto_excerpt(&self, content: &str) -> String {
        seo::summarize(&self.renderer.plain_text(content), DESCRIPTION_LEN)
    }

    async fn load_all(&self) -> Result<Vec<Post>, DomainError> {
        self.repo
            .find_all()
            .await
            .map_err(|e| repo_failure("list", "*", e))
    }

    async fn visible_to(&self, auth: &AuthContext) -> Result<Vec<Post>, DomainError> {
        let mut posts = self.load_all().await?;
        if !auth.is_admin() {
            posts.retain(Post::is_published);
        }
        Ok(posts)
    }

    async fn fetch(&self, slug: &str) -> Result<Post, DomainError> {
        self.repo
            .find_by_slug(slug)
            .await
            .map_err(|e| repo_failure("read", slug, e))?
            .ok_or_else(|| DomainError::post_not_found(slug))
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool, DomainError> {
        self.repo
            .slug_exists(slug)
            .await
            .map_err(|e| repo_failure("read", slug, e))
    }

    /// Slug from the title, suffixed `-2`, `-3`, ... until unused.
    async fn derive_slug(&self, title: &str) -> Result<String, DomainError> {
        let base = slugify(title);
        if base.is_empty() {
            return Err(DomainError::Validation(format!(
                "title '{}' does not produce a usable slug",
                title
            )));
        }
        if !self.slug_taken(&base).await? {
            return Ok(base);
        }
        for n in 2..=MAX_SLUG_SUFFIX {
            let candidate = format!("{}-{}", base, n);
            if !self.slug_taken(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DomainError::Conflict(format!(
            "no free slug left for '{}'",
            base
        )))
    }
}

fn require_admin(auth: &AuthContext, action: &str) -> Result<(), DomainError> {
    if auth.is_admin() {
        return Ok(());
    }
    tracing::warn!(action, subject = ?auth.subject, "Rejected non-admin request");
    Err(DomainError::Unauthorized)
}

/// Resolve the version an update is conditioned on.
fn check_version(post: &Post, expected: Option<u64>) -> Result<u64, DomainError> {
    match expected {
        Some(v) if v != post.version => Err(DomainError::Conflict(format!(
            "post '{}' is at version {}, not {}",
            post.slug, post.version, v
        ))),
        _ => Ok(post.version),
    }
}

/// Map a storage failure to the caller-facing taxonomy, logging backend faults.
fn repo_failure(op: &str, slug: &str, err: RepoError) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::post_not_found(slug),
        RepoError::Constraint(detail) => DomainError::Conflict(detail),
        RepoError::StaleVersion { expected } => DomainError::Conflict(format!(
            "post '{}' changed since version {}",
            slug, expected
        )),
        other => {
            tracing::error!(op, slug, error = %other, "Post store failure");
            DomainError::Storage(format!("could not {} post", op))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl PostRepository for BrokenStore {
        async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
            Err(RepoError::Connection("refused".into()))
        }
        async fn find_by_slug(&self, _slug: &str) -> Result<Option<Post>, RepoError> {
            Err(RepoError::Io("disk gone".into()))
        }
        async fn insert(&self, _post: Post) -> Result<Post, RepoError> {
            Err(RepoError::Constraint("slug is already in use".into()))
        }
        async fn update(&self, _post: Post, expected: u64) -> Result<Post, RepoError> {
            Err(RepoError::StaleVersion { expected })
        }
        async fn delete(&self, _slug: &str, _expected: Option<u64>) -> Result<(), RepoError> {
            Err(RepoError::NotFound)
        }
    }

    struct Verbatim;

    impl ContentRenderer for Verbatim {
        fn render(&self, markdown: &str) -> String {
            markdown.to_string()
        }
        fn plain_text(&self, markdown: &str) -> String {
            markdown.to_string()
        }
    }

    fn service() -> BlogService {
        BlogService::new(Arc::new(BrokenStore), Arc::new(Verbatim))
    }

    #[tokio::test]
    async fn test_backend_faults_become_storage_errors() {
        let blog = service();

        assert!(matches!(
            blog.search_posts(&SearchQuery::default()).await,
            Err(DomainError::Storage(_))
        ));
        assert!(matches!(
            blog.get_post("any").await,
            Err(DomainError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_repository_outcomes_keep_their_meaning() {
        let blog = service();
        let admin = AuthContext::admin("a@b.c");

        assert!(matches!(
            blog.delete_post("gone", None, &admin).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            blog.delete_post("gone", None, &AuthContext::anonymous()).await,
            Err(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected_before_storage() {
        let blog = service();
        let patch = PostPatch {
            expected_version: Some(3),
            ..PostPatch::default()
        };

        assert!(matches!(
            blog.update_post("any", patch, &AuthContext::admin("a@b.c")).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_check_version() {
        let mut post = Post::create(
            NewPost::new("T", "c"),
            "t".into(),
            "c".into(),
            "a".into(),
            Utc::now(),
        );
        post.version = 4;

        assert_eq!(check_version(&post, None).unwrap(), 4);
        assert_eq!(check_version(&post, Some(4)).unwrap(), 4);
        assert!(matches!(
            check_version(&post, Some(3)),
            Err(DomainError::Conflict(_))
        ));
    }
}
