//! Domain entities - the core business objects.

mod access;
mod post;
mod query;

pub use access::{ADMIN_ROLE, AuthContext};
pub use post::{NewPost, Post, PostPatch, PostStatus, RenderedPost, is_valid_slug, slugify};
pub use query::{
    DEFAULT_PAGE_SIZE, FacetCount, MAX_PAGE_SIZE, SearchQuery, SearchResult, SortKey, SortOrder,
};
