//! Filtering, sorting and pagination over an in-memory post collection.
//!
//! Pure functions: the caller loads the posts, nothing here touches storage.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{FacetCount, Post, SearchQuery, SearchResult, SortKey, SortOrder};
use crate::error::DomainError;

/// Run a search. Filters apply in order status, category, tag, free text.
pub fn run(posts: Vec<Post>, query: &SearchQuery) -> Result<SearchResult<Post>, DomainError> {
    query.validate()?;

    let needle = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<Post> = posts
        .into_iter()
        .filter(|p| query.status.is_none_or(|s| p.status == s))
        .filter(|p| has_label(&p.categories, query.category.as_deref()))
        .filter(|p| has_label(&p.tags, query.tag.as_deref()))
        .filter(|p| needle.as_deref().is_none_or(|n| matches_text(p, n)))
        .collect();

    matches.sort_by(|a, b| compare(a, b, query.sort_by, query.sort_order));

    let total = matches.len();
    let items = matches
        .into_iter()
        .skip(query.offset())
        .take(query.limit as usize)
        .collect();

    Ok(SearchResult { items, total })
}

fn has_label(labels: &[String], wanted: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => labels.iter().any(|l| l == wanted),
        None => true,
    }
}

/// `needle` must already be lowercase.
fn matches_text(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post.excerpt.to_lowercase().contains(needle)
        || post.content.to_lowercase().contains(needle)
}

fn compare(a: &Post, b: &Post, key: SortKey, order: SortOrder) -> Ordering {
    let primary = match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    // id ascending regardless of direction
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Count posts per category.
pub fn categories(posts: &[Post]) -> Vec<FacetCount> {
    facet(posts.iter().flat_map(|p| p.categories.iter()))
}

/// Count posts per tag.
pub fn tags(posts: &[Post]) -> Vec<FacetCount> {
    facet(posts.iter().flat_map(|p| p.tags.iter()))
}

fn facet<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<FacetCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| FacetCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
