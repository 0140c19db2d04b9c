//! Search-engine metadata for a single post.

use serde::Serialize;
use serde_json::json;

use crate::domain::RenderedPost;

/// Longest description search engines display without truncating.
pub const DESCRIPTION_LEN: usize = 160;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSeo {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub image: Option<String>,
    pub keywords: Vec<String>,
    /// schema.org `BlogPosting` document.
    pub json_ld: serde_json::Value,
}

/// Shorten `text` to at most `max_chars` characters, cutting on a word boundary.
pub fn summarize(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }

    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

fn absolute(site_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        site_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Build page metadata and the JSON-LD document for a post.
pub fn for_post(rendered: &RenderedPost, site_url: &str, site_name: &str) -> PostSeo {
    let post = &rendered.post;
    let canonical_url = absolute(site_url, &format!("blog/{}", post.slug));
    let description = summarize(&post.excerpt, DESCRIPTION_LEN);
    let image = post.cover_image.as_deref().map(|c| absolute(site_url, c));
    let keywords: Vec<String> = post
        .categories
        .iter()
        .chain(post.tags.iter())
        .cloned()
        .collect();

    let json_ld = json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": post.title,
        "description": description,
        "author": { "@type": "Person", "name": post.author },
        "publisher": { "@type": "Organization", "name": site_name },
        "datePublished": post.published_at.unwrap_or(post.date).to_rfc3339(),
        "dateModified": post.updated_at.to_rfc3339(),
        "mainEntityOfPage": { "@type": "WebPage", "@id": canonical_url },
        "image": image,
        "keywords": keywords.join(", "),
    });

    PostSeo {
        title: format!("{} | {}", post.title, site_name),
        description,
        canonical_url,
        image,
        keywords,
        json_ld,
    }
}
