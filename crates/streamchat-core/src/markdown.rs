//! Markdown to HTML conversion.

use pulldown_cmark::{html, Options, Parser};

/// Render markdown as an HTML fragment.
///
/// The output is trusted and is not sanitized.
#[must_use]
pub fn to_html(markdown: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(markdown, options);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
