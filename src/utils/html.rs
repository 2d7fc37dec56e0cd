//! Helpers for turning feed and article HTML into plain text
//!
//! Markup is parsed with html5ever, so every character reference the HTML
//! standard knows is decoded and malformed markup is recovered the way a
//! browser would.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use once_cell::sync::Lazy;
use regex::Regex;

/// Elements whose boundaries start a new paragraph
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "blockquote", "section",
    "article", "header", "footer", "figure", "figcaption", "table", "tr", "br",
];

/// Elements whose text is never shown
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "template", "noscript"];

const SOFT_HYPHEN: char = '\u{ad}';

static INLINE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{a0}\u{2009}\u{202f}]+").expect("Valid whitespace regex"));

static PARAGRAPH_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Valid paragraph gap regex"));

static CDATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("Valid CDATA regex"));

fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

/// Append the visible text below `handle`. With `paragraphs` set, block
/// elements are surrounded by blank lines.
fn collect_text(handle: &Handle, paragraphs: bool, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            let tag: &str = &name.local;
            if HIDDEN_ELEMENTS.contains(&tag) {
                return;
            }

            let block = paragraphs && BLOCK_ELEMENTS.contains(&tag);
            if block {
                out.push_str("\n\n");
            }
            for child in handle.children.borrow().iter() {
                collect_text(child, paragraphs, out);
            }
            if block {
                out.push_str("\n\n");
            }
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, paragraphs, out);
            }
        }
        _ => {}
    }
}

/// Decode character references. Any markup in the input is dropped.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') && !s.contains('<') {
        return s.to_string();
    }

    let dom = parse(s);
    let mut out = String::with_capacity(s.len());
    collect_text(&dom.document, false, &mut out);
    out
}

/// Unwrap `<![CDATA[...]]>` sections in place
pub fn unwrap_cdata(s: &str) -> String {
    CDATA.replace_all(s, "$1").into_owned()
}

/// Convert an HTML (or plain-text) article body into blank-line separated
/// paragraphs of plain text.
pub fn html_to_text(html: &str) -> String {
    let dom = parse(html);
    let mut text = String::with_capacity(html.len());
    collect_text(&dom.document, true, &mut text);
    text.retain(|c| c != SOFT_HYPHEN);

    let lines: Vec<String> = text
        .lines()
        .map(|line| INLINE_SPACE.replace_all(line, " ").trim().to_string())
        .collect();

    PARAGRAPH_GAP
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_and_numeric() {
        assert_eq!(
            decode_entities("Gr&uuml;&szlig;e &amp; K&#246;ln &#x2013; mehr"),
            "Grüße & Köln – mehr"
        );
    }

    #[test]
    fn test_decode_less_common_named_entities() {
        assert_eq!(decode_entities("&Eacute;cole &sect; 5 Fran&ccedil;ais"), "École § 5 Français");
        assert_eq!(decode_entities("a&thinsp;b"), "a\u{2009}b");
    }

    #[test]
    fn test_decode_leaves_unknown_entities() {
        assert_eq!(decode_entities("a &bogus; b"), "a &bogus; b");
        assert_eq!(decode_entities("AT&T"), "AT&T");
    }

    #[test]
    fn test_decode_is_single_level() {
        assert_eq!(decode_entities("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
        assert_eq!(decode_entities("&lt;p&gt;Hi&lt;/p&gt;"), "<p>Hi</p>");
    }

    #[test]
    fn test_decode_drops_markup() {
        assert_eq!(decode_entities("<b>fett</b> und <a href=\"x\">Link</a>"), "fett und Link");
    }

    #[test]
    fn test_unwrap_cdata() {
        assert_eq!(unwrap_cdata("<![CDATA[Die <b>Bahn</b>]]>"), "Die <b>Bahn</b>");
        assert_eq!(unwrap_cdata("kein cdata"), "kein cdata");
    }

    #[test]
    fn test_html_to_text_paragraphs() {
        let html = "<h2>Die Lage</h2><p>Erster   Absatz.</p>\n<p>Zweiter<br/>Teil &amp; mehr.</p>";
        let text = html_to_text(html);
        assert_eq!(text, "Die Lage\n\nErster Absatz.\n\nZweiter\n\nTeil & mehr.");
    }

    #[test]
    fn test_html_to_text_removes_soft_hyphens() {
        let html = "<p>Die Eisen&shy;bahn f&auml;hrt nach &Eacute;pinal.</p>";
        assert_eq!(html_to_text(html), "Die Eisenbahn fährt nach Épinal.");
    }

    #[test]
    fn test_html_to_text_skips_scripts() {
        let html = "<p>Text</p><script>alert(1)</script><style>p {}</style>";
        assert_eq!(html_to_text(html), "Text");
    }

    #[test]
    fn test_html_to_text_plain_input_is_kept() {
        let text = "Erster Absatz.\n\nZweiter Absatz.";
        assert_eq!(html_to_text(text), text);
    }
}
