use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(DomainError::Validation(format!(
                "unknown post status '{}'",
                other
            ))),
        }
    }
}

/// Post entity - a blog article written in markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// Raw markdown body.
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub date: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every mutation.
    pub version: u64,
}

/// Input for creating a post. Only `title` and `content` are required.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub status: Option<PostStatus>,
    pub date: Option<DateTime<Utc>>,
}

/// Partial update of a post. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    /// `Some(None)` clears the cover image.
    pub cover_image: Option<Option<String>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
    pub date: Option<DateTime<Utc>>,
    /// Version the caller last saw; the update is rejected if the stored post moved on.
    pub expected_version: Option<u64>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.author.is_none()
            && self.cover_image.is_none()
            && self.categories.is_none()
            && self.tags.is_none()
            && self.status.is_none()
            && self.date.is_none()
    }
}

/// Derive a URL-safe slug from a title: `"Hello, World!"` becomes `"hello-world"`.
pub fn slugify(title: &str) -> String {
    slug::slugify(title)
}

/// Returns true when `slug` is already in canonical slug form.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        if let Some(slug) = &self.slug {
            if !is_valid_slug(slug) {
                return Err(DomainError::Validation(format!(
                    "slug '{}' must be lowercase letters, digits and hyphens",
                    slug
                )));
            }
        }
        Ok(())
    }
}

impl Post {
    /// Build a fresh post from validated input. The caller resolves slug, excerpt and author.
    pub fn create(
        input: NewPost,
        slug: String,
        excerpt: String,
        author: String,
        now: DateTime<Utc>,
    ) -> Self {
        let status = input.status.unwrap_or(PostStatus::Draft);
        Self {
            id: Uuid::new_v4(),
            slug,
            title: input.title.trim().to_string(),
            excerpt,
            content: input.content,
            author,
            cover_image: input.cover_image.filter(|c| !c.trim().is_empty()),
            categories: normalize_labels(input.categories),
            tags: normalize_labels(input.tags),
            status,
            date: input.date.unwrap_or(now),
            published_at: (status == PostStatus::Published).then_some(now),
            updated_at: now,
            version: 1,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Merge a patch onto this post. The slug never changes.
    pub fn apply(&mut self, patch: PostPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(status) = patch.status {
            self.transition(status, now)?;
        }
        if let Some(title) = patch.title {
            require_text("title", &title)?;
            self.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            require_text("content", &content)?;
            self.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(cover_image) = patch.cover_image {
            self.cover_image = cover_image.filter(|c| !c.trim().is_empty());
        }
        if let Some(categories) = patch.categories {
            self.categories = normalize_labels(categories);
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_labels(tags);
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        self.touch(now);
        Ok(())
    }

    /// Draft to published. Publishing an already published post keeps its `published_at`.
    pub fn publish(&mut self, now: DateTime<Utc>) {
        if self.status == PostStatus::Draft {
            self.status = PostStatus::Published;
            self.published_at = Some(now);
        }
    }

    fn transition(&mut self, to: PostStatus, now: DateTime<Utc>) -> Result<(), DomainError> {
        match (self.status, to) {
            (PostStatus::Published, PostStatus::Draft) => Err(DomainError::Validation(
                "a published post cannot be moved back to draft".to_string(),
            )),
            (_, PostStatus::Published) => {
                self.publish(now);
                Ok(())
            }
            (PostStatus::Draft, PostStatus::Draft) => Ok(()),
        }
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

/// A post together with its sanitized HTML. Every post leaving the facade takes this form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPost {
    #[serde(flatten)]
    pub post: Post,
    pub html: String,
}
