//! Markdown files with YAML front-matter.
//!
//! ```text
//! ---
//! id: 6f1c...
//! title: Hello, World!
//! status: published
//! date: 2024-01-15T10:30:00Z
//! tags:
//!   - grammar
//! ---
//! # Body in markdown
//! ```
//!
//! The slug is the file stem and is not repeated inside the file.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use lingua_core::domain::{Post, PostStatus};
use lingua_core::error::RepoError;

const FENCE: &str = "---";

#[derive(Debug, Serialize, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    id: Option<Uuid>,
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_image: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_status")]
    status: PostStatus,
    #[serde(deserialize_with = "flexible_date")]
    date: DateTime<Utc>,
    #[serde(default, deserialize_with = "flexible_date_opt")]
    published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_date_opt")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    version: u64,
}

fn default_status() -> PostStatus {
    PostStatus::Draft
}

fn default_version() -> u64 {
    1
}

/// Accepts RFC 3339 as well as the shorter forms people type by hand.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn flexible_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

fn flexible_date_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
        None => Ok(None),
    }
}

/// Parse a post file. `slug` is the file stem.
pub fn parse(source: &str, slug: &str) -> Result<Post, RepoError> {
    let source = source.trim_start_matches('\u{feff}');
    let after_open = source
        .strip_prefix(FENCE)
        .ok_or_else(|| RepoError::Serialization(format!("{}: missing front-matter", slug)))?;
    let end = after_open
        .find("\n---")
        .ok_or_else(|| RepoError::Serialization(format!("{}: unterminated front-matter", slug)))?;

    let yaml = &after_open[..end];
    let body = &after_open[end + 1 + FENCE.len()..];
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);

    let fm: FrontMatter = serde_yaml::from_str(yaml)
        .map_err(|e| RepoError::Serialization(format!("{}: {}", slug, e)))?;

    // Hand-written files may omit the id; derive a stable one from the slug
    let id = fm
        .id
        .unwrap_or_else(|| Uuid::new_v5(&Uuid::NAMESPACE_URL, slug.as_bytes()));
    let published_at = match fm.status {
        PostStatus::Published => fm.published_at.or(Some(fm.date)),
        PostStatus::Draft => fm.published_at,
    };

    Ok(Post {
        id,
        slug: slug.to_string(),
        title: fm.title,
        excerpt: fm.excerpt,
        content: body.to_string(),
        author: fm.author,
        cover_image: fm.cover_image,
        categories: fm.categories,
        tags: fm.tags,
        status: fm.status,
        date: fm.date,
        published_at,
        updated_at: fm.updated_at.unwrap_or(fm.date),
        version: fm.version,
    })
}

/// Serialize a post into its file form.
pub fn render(post: &Post) -> Result<String, RepoError> {
    let fm = FrontMatter {
        id: Some(post.id),
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        author: post.author.clone(),
        cover_image: post.cover_image.clone(),
        categories: post.categories.clone(),
        tags: post.tags.clone(),
        status: post.status,
        date: post.date,
        published_at: post.published_at,
        updated_at: Some(post.updated_at),
        version: post.version,
    };
    let yaml = serde_yaml::to_string(&fm).map_err(|e| RepoError::Serialization(e.to_string()))?;
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n{}", post.content))
}
