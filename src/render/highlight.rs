//! Vocabulary highlighting for article paragraphs
//!
//! Wraps every standalone occurrence of a vocabulary term in inline tooltip
//! markup. Terms are applied longest first; text already wrapped by an earlier
//! term is never matched again, so the first (longest) match wins.
//!
//! A match is standalone when the characters on both sides of it are not
//! Unicode letters: `Bahn` matches in `Die Bahn kommt` but not in `Bahnhof`,
//! and `für` does not match inside `dafür`. Matching is case-sensitive and
//! literal; there is no stemming.
//!
//! [`Highlighter::highlight`] leaves the text around annotations untouched.
//! [`Highlighter::highlight_html`] HTML-escapes it, for embedding plain source
//! text in a page. Both recognise annotations from an earlier pass and keep
//! them verbatim, which makes highlighting idempotent.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use super::escape_html;
use crate::types::VocabularyTerm;
use crate::utils::string::truncate_at_char_boundary;

/// Paragraphs shorter than this (in chars, after trimming) are never headings
const HEADING_MIN_CHARS: usize = 3;
/// Paragraphs this long or longer are never headings
const HEADING_MAX_CHARS: usize = 120;
const HEADING_MAX_TOKENS: usize = 12;
/// Required share of capitalized tokens, in percent
const HEADING_CAPITALIZED_PERCENT: usize = 60;

/// Annotation markup exactly as [`annotation_markup`] writes it. Every text
/// part is escaped there, so none of them can contain `<`.
static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"<span class="vocab vocab-[a-z]+" tabindex="0">(?P<surface>[^<]*)"#,
        r#"<span class="vocab-tip" role="tooltip"><b class="vocab-term">[^<]*</b> "#,
        r#"<i class="vocab-pos">[^<]*</i><br>[^<]*"#,
        r#"(?:<br><q class="vocab-example">[^<]*</q>)?</span></span>"#,
    ))
    .expect("Valid annotation regex")
});

/// Upper bound for one term's compiled pattern, in bytes
const TERM_PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// One or more blank lines (whitespace-only lines count as blank)
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("Valid blank line regex"));

/// Working representation of a paragraph while terms are applied
#[derive(Debug, Clone)]
enum Segment {
    /// Source text, still open to matching
    Text(String),
    /// Finished markup; `leading`/`trailing` are the visible characters at
    /// its edges, used for boundary checks of neighbouring text
    Markup {
        html: String,
        leading: Option<char>,
        trailing: Option<char>,
    },
}

impl Segment {
    fn first_char(&self) -> Option<char> {
        match self {
            Segment::Text(text) => text.chars().next(),
            Segment::Markup { leading, .. } => *leading,
        }
    }

    fn last_char(&self) -> Option<char> {
        match self {
            Segment::Text(text) => text.chars().next_back(),
            Segment::Markup { trailing, .. } => *trailing,
        }
    }

    fn into_raw(self) -> String {
        match self {
            Segment::Text(text) => text,
            Segment::Markup { html, .. } => html,
        }
    }

    fn into_html(self) -> String {
        match self {
            Segment::Text(text) => escape_html(&text),
            Segment::Markup { html, .. } => html,
        }
    }
}

/// A term together with its compiled search pattern
struct CompiledTerm<'a> {
    term: &'a VocabularyTerm,
    pattern: Regex,
}

/// Highlighter for one article's term list
///
/// Compiles each term once so the same list can be applied to every
/// paragraph of an article.
pub struct Highlighter<'a> {
    terms: Vec<CompiledTerm<'a>>,
}

impl<'a> Highlighter<'a> {
    /// Prepare the term list: longest first, ties keep their input order.
    ///
    /// Terms with an empty surface form are ignored. A term whose pattern
    /// fails to compile is logged and skipped.
    pub fn new(terms: &'a [VocabularyTerm]) -> Self {
        let mut ordered: Vec<&VocabularyTerm> =
            terms.iter().filter(|t| !t.term.is_empty()).collect();
        ordered.sort_by_key(|t| std::cmp::Reverse(t.term.chars().count()));

        let terms = ordered
            .into_iter()
            .filter_map(|term| match compile_term(&term.term) {
                Ok(pattern) => Some(CompiledTerm { term, pattern }),
                Err(e) => {
                    warn!(
                        "Skipping vocabulary term '{}': {}",
                        truncate_at_char_boundary(&term.term, 40),
                        e
                    );
                    None
                }
            })
            .collect();

        Self { terms }
    }

    /// Number of usable terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Annotate one paragraph. Text outside annotations is returned as is;
    /// without terms the paragraph comes back unchanged.
    pub fn highlight(&self, paragraph: &str) -> String {
        self.segments(paragraph)
            .into_iter()
            .map(Segment::into_raw)
            .collect()
    }

    /// Annotate one plain-text paragraph for embedding in HTML: text outside
    /// annotations is escaped.
    pub fn highlight_html(&self, paragraph: &str) -> String {
        self.segments(paragraph)
            .into_iter()
            .map(Segment::into_html)
            .collect()
    }

    fn segments(&self, paragraph: &str) -> Vec<Segment> {
        if paragraph.is_empty() {
            return Vec::new();
        }

        let mut segments = protect_annotations(paragraph);

        for compiled in &self.terms {
            let edges: Vec<(Option<char>, Option<char>)> = (0..segments.len())
                .map(|i| {
                    let before = i.checked_sub(1).and_then(|j| segments[j].last_char());
                    let after = segments.get(i + 1).and_then(Segment::first_char);
                    (before, after)
                })
                .collect();

            segments = segments
                .into_iter()
                .zip(edges)
                .flat_map(|(segment, (before, after))| match segment {
                    Segment::Text(text) => wrap_matches(&text, compiled, before, after),
                    markup => vec![markup],
                })
                .collect();
        }

        segments
    }
}

fn compile_term(term: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(term))
        .size_limit(TERM_PATTERN_SIZE_LIMIT)
        .build()
}

/// Annotate one paragraph with a term list.
///
/// Convenience wrapper around [`Highlighter`]; prefer the struct when the
/// same terms are applied to many paragraphs.
pub fn highlight(paragraph: &str, terms: &[VocabularyTerm]) -> String {
    Highlighter::new(terms).highlight(paragraph)
}

/// Split the input into open text and annotations from an earlier pass
fn protect_annotations(paragraph: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in ANNOTATION.captures_iter(paragraph) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(paragraph[last..whole.start()].to_string()));
        }

        let surface = caps.name("surface").map_or("", |m| m.as_str());
        segments.push(Segment::Markup {
            html: whole.as_str().to_string(),
            // A leading '&' starts a character reference, not a letter
            leading: surface.chars().next().filter(|c| *c != '&'),
            trailing: surface.chars().next_back(),
        });
        last = whole.end();
    }

    if last < paragraph.len() {
        segments.push(Segment::Text(paragraph[last..].to_string()));
    }

    segments
}

/// Wrap every standalone match of one term inside a text segment.
///
/// `before` and `after` are the visible characters just outside the segment.
fn wrap_matches(
    text: &str,
    compiled: &CompiledTerm<'_>,
    before: Option<char>,
    after: Option<char>,
) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut emitted = 0;
    let mut pos = 0;

    while let Some(m) = compiled.pattern.find_at(text, pos) {
        if m.as_str().is_empty() {
            break;
        }

        let prev = text[..m.start()].chars().next_back().or(before);
        let next = text[m.end()..].chars().next().or(after);

        if !is_letter(prev) && !is_letter(next) {
            if m.start() > emitted {
                out.push(Segment::Text(text[emitted..m.start()].to_string()));
            }
            out.push(Segment::Markup {
                html: annotation_markup(m.as_str(), compiled.term),
                leading: m.as_str().chars().next(),
                trailing: m.as_str().chars().next_back(),
            });
            emitted = m.end();
            pos = m.end();
        } else {
            // Retry one character further; a later overlapping candidate may qualify
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
    }

    if emitted < text.len() || out.is_empty() {
        out.push(Segment::Text(text[emitted..].to_string()));
    }

    out
}

fn is_letter(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphabetic)
}

/// Inline markup for one matched occurrence
fn annotation_markup(surface: &str, term: &VocabularyTerm) -> String {
    let example = if term.example.is_empty() {
        String::new()
    } else {
        format!(
            r#"<br><q class="vocab-example">{}</q>"#,
            escape_html(&term.example)
        )
    };

    format!(
        r#"<span class="vocab vocab-{category}" tabindex="0">{surface}<span class="vocab-tip" role="tooltip"><b class="vocab-term">{term}</b> <i class="vocab-pos">{pos}</i><br>{gloss}{example}</span></span>"#,
        category = term.category.as_str(),
        surface = escape_html(surface),
        term = escape_html(&term.term),
        pos = escape_html(&term.part_of_speech),
        gloss = escape_html(&term.gloss),
        example = example,
    )
}

/// Decide whether a paragraph reads like a subheading.
///
/// Short, no terminal punctuation, not a list item, at most twelve words,
/// and at least 60% of the words capitalized.
pub fn is_heading(paragraph: &str) -> bool {
    let text = paragraph.trim();

    let chars = text.chars().count();
    if !(HEADING_MIN_CHARS..HEADING_MAX_CHARS).contains(&chars) {
        return false;
    }
    if text.ends_with(&['.', '!', '?'][..]) {
        return false;
    }
    if text.starts_with(&['-', '*', '•'][..]) {
        return false;
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > HEADING_MAX_TOKENS {
        return false;
    }

    let capitalized = tokens
        .iter()
        .filter(|t| t.chars().next().is_some_and(char::is_uppercase))
        .count();

    capitalized * 100 >= tokens.len() * HEADING_CAPITALIZED_PERCENT
}

/// Split an article body into paragraphs on blank lines
pub fn split_paragraphs(body: &str) -> Vec<String> {
    let normalized = body.replace("\r\n", "\n");
    BLANK_LINES
        .split(&normalized)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// A rendered paragraph: highlighted markup, promoted to a heading or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotatedParagraph {
    Heading(String),
    Body(String),
}

impl AnnotatedParagraph {
    /// Classify and highlight one paragraph. Empty paragraphs yield `None`.
    pub fn annotate(paragraph: &str, highlighter: &Highlighter<'_>) -> Option<Self> {
        let text = paragraph.trim();
        if text.is_empty() {
            return None;
        }

        let markup = highlighter.highlight_html(text);
        if is_heading(text) {
            Some(AnnotatedParagraph::Heading(markup))
        } else {
            Some(AnnotatedParagraph::Body(markup))
        }
    }

    pub fn markup(&self) -> &str {
        match self {
            AnnotatedParagraph::Heading(markup) | AnnotatedParagraph::Body(markup) => markup,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, AnnotatedParagraph::Heading(_))
    }

    pub fn to_html(&self) -> String {
        match self {
            AnnotatedParagraph::Heading(markup) => format!("<h3>{}</h3>", markup),
            AnnotatedParagraph::Body(markup) => format!("<p>{}</p>", markup),
        }
    }
}

/// Render a whole article body: split, classify, highlight
pub fn render_body(body: &str, terms: &[VocabularyTerm]) -> String {
    let highlighter = Highlighter::new(terms);
    split_paragraphs(body)
        .iter()
        .filter_map(|p| AnnotatedParagraph::annotate(p, &highlighter))
        .map(|p| p.to_html())
        .collect::<Vec<_>>()
        .join("\n")
}
