//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use lingua_core::DomainError;
use lingua_core::domain::{
    FacetCount, NewPost, PostPatch, PostStatus, RenderedPost, SearchQuery, SearchResult,
};
use lingua_core::seo::PostSeo;

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Body of `POST /api/blog`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl TryFrom<CreatePostRequest> for NewPost {
    type Error = DomainError;

    fn try_from(req: CreatePostRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            content: req.content,
            slug: non_blank(req.slug),
            excerpt: req.excerpt,
            author: req.author,
            cover_image: req.cover_image,
            categories: req.categories,
            tags: req.tags,
            status: parse_status(req.status)?,
            date: req.date,
        })
    }
}

/// Body of `PUT /api/blog/{slug}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// `null` clears the cover image, absence keeps it.
    #[serde(default, deserialize_with = "present")]
    pub cover_image: Option<Option<String>>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Version the client last read. `If-Match` takes precedence.
    #[serde(default)]
    pub version: Option<u64>,
}

impl TryFrom<UpdatePostRequest> for PostPatch {
    type Error = DomainError;

    fn try_from(req: UpdatePostRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            author: req.author,
            cover_image: req.cover_image,
            categories: req.categories,
            tags: req.tags,
            status: parse_status(req.status)?,
            date: req.date,
            expected_version: req.version,
        })
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/blog/{slug}/publish`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub html: String,
}

/// A single post, as returned by create, update and publish.
#[derive(Debug, Clone, Serialize)]
pub struct PostEnvelope {
    pub post: RenderedPost,
}

/// `GET /api/blog/{slug}`: the post plus its page metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailResponse {
    pub post: RenderedPost,
    pub seo: PostSeo,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<RenderedPost>,
    pub total: usize,
}

impl From<SearchResult<RenderedPost>> for PostListResponse {
    fn from(result: SearchResult<RenderedPost>) -> Self {
        Self {
            posts: result.items,
            total: result.total,
        }
    }
}

pub type FacetListResponse = Vec<FacetCount>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Raw query string of `GET /api/blog`, validated into a [`SearchQuery`].
///
/// Numbers are kept as text so malformed values surface as validation
/// errors instead of extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl TryFrom<SearchParams> for SearchQuery {
    type Error = DomainError;

    fn try_from(params: SearchParams) -> Result<Self, Self::Error> {
        let defaults = SearchQuery::default();
        let query = SearchQuery {
            text: non_blank(params.query),
            category: non_blank(params.category),
            tag: non_blank(params.tag),
            status: parse_status(params.status)?,
            sort_by: match non_blank(params.sort_by) {
                Some(s) => s.parse()?,
                None => defaults.sort_by,
            },
            sort_order: match non_blank(params.sort_order) {
                Some(s) => s.parse()?,
                None => defaults.sort_order,
            },
            page: parse_number("page", params.page)?.unwrap_or(defaults.page),
            limit: parse_number("limit", params.limit)?.unwrap_or(defaults.limit),
        };
        query.validate()?;
        Ok(query)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_status(value: Option<String>) -> Result<Option<PostStatus>, DomainError> {
    non_blank(value).map(|s| s.parse()).transpose()
}

fn parse_number(name: &str, value: Option<String>) -> Result<Option<u32>, DomainError> {
    non_blank(value)
        .map(|v| {
            v.parse::<u32>().map_err(|_| {
                DomainError::Validation(format!("{} must be a positive integer, got '{}'", name, v))
            })
        })
        .transpose()
}
