//! Content rendering port.

/// Turns raw markdown into markup safe to inject into a page.
pub trait ContentRenderer: Send + Sync {
    /// Render markdown to sanitized HTML. Embedded raw HTML is cleaned, never trusted.
    fn render(&self, markdown: &str) -> String;

    /// Text content of the markdown with all markup removed.
    fn plain_text(&self, markdown: &str) -> String;
}
