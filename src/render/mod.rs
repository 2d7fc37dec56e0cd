//! Static site rendering
//!
//! Turns processed articles into HTML pages: the vocabulary highlighter for
//! article bodies and the site writer for the index and article pages.

pub mod highlight;
pub mod site;

pub use highlight::{highlight, is_heading, split_paragraphs, AnnotatedParagraph, Highlighter};
pub use site::{SiteRenderer, SiteSummary};

/// Escape text for safe embedding in HTML content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
