//! Markdown to sanitized HTML.

use pulldown_cmark::{Event, Options, Parser, TagEnd, html};

use lingua_core::ports::ContentRenderer;

/// CommonMark renderer with GitHub-style extensions, cleaned by ammonia.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    link_rel: &'static str,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
            link_rel: "nofollow noopener noreferrer",
        }
    }

    fn sanitize(&self, unsafe_html: &str) -> String {
        ammonia::Builder::default()
            .add_tags(["input"])
            .add_tag_attributes("input", ["type", "checked", "disabled"])
            .add_tag_attributes("code", ["class"])
            .link_rel(Some(self.link_rel))
            .clean(unsafe_html)
            .to_string()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut unsafe_html = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut unsafe_html, parser);
        self.sanitize(&unsafe_html)
    }

    fn plain_text(&self, markdown: &str) -> String {
        let mut text = String::with_capacity(markdown.len());
        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                    text.push(' ')
                }
                _ => {}
            }
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
