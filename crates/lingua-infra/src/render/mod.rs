//! Content renderers.

mod markdown;

pub use markdown::MarkdownRenderer;
