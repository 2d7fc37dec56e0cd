//! Static site writer
//!
//! Emits `index.html`, one page per article under `articles/`, and a shared
//! `style.css` into the output directory.

use super::escape_html;
use super::highlight::render_body;
use crate::error::Result;
use crate::storage::slug_for;
use crate::types::{Category, ProcessedArticle, QuizQuestion, VocabularyTerm};
use crate::utils::string::truncate_at_char_boundary;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Teaser length on the index page, in chars
const INDEX_DESCRIPTION_CHARS: usize = 200;

const STYLESHEET: &str = r#"body { font-family: Georgia, serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; line-height: 1.6; color: #222; }
header a { color: inherit; text-decoration: none; }
time { color: #666; font-size: 0.9rem; }
.notice { background: #fff4d6; border-left: 4px solid #e0a800; padding: 0.5rem 1rem; }
.articles { list-style: none; padding: 0; }
.articles li { margin-bottom: 1.5rem; }
.term-count { font-size: 0.8rem; color: #555; }
.vocab { position: relative; border-bottom: 2px solid; cursor: help; }
.vocab-beginner { border-color: #3c9d5d; }
.vocab-intermediate { border-color: #d08a00; }
.vocab-advanced { border-color: #c0392b; }
.vocab-tip { display: none; position: absolute; left: 0; top: 1.6em; z-index: 10; width: 18rem; padding: 0.5rem; background: #fff; border: 1px solid #ccc; box-shadow: 0 2px 6px rgba(0,0,0,.15); font-size: 0.9rem; }
.vocab:hover .vocab-tip, .vocab:focus .vocab-tip { display: block; }
.vocab-pos { color: #666; }
.vocab-list dt { font-weight: bold; }
.vocab-list dd { margin: 0 0 0.75rem 1rem; }
.quiz-question { margin-bottom: 1.25rem; }
.quiz-answer { font-weight: bold; }
"#;

/// What a render pass wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    pub index_path: PathBuf,
    pub article_pages: Vec<PathBuf>,
}

/// Writes the static site into one output directory
pub struct SiteRenderer {
    output_dir: PathBuf,
    site_title: String,
}

impl SiteRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, site_title: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            site_title: site_title.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render the index and every article page. `articles` is listed in the
    /// order given.
    pub fn render(&self, articles: &[ProcessedArticle]) -> Result<SiteSummary> {
        let pages_dir = self.output_dir.join("articles");
        fs::create_dir_all(&pages_dir)?;

        fs::write(self.output_dir.join("style.css"), STYLESHEET)?;

        let mut article_pages = Vec::with_capacity(articles.len());
        for processed in articles {
            let path = pages_dir.join(format!("{}.html", slug_for(&processed.article)));
            fs::write(&path, self.article_page(processed))?;
            debug!("Wrote {}", path.display());
            article_pages.push(path);
        }

        let index_path = self.output_dir.join("index.html");
        fs::write(&index_path, self.index_page(articles))?;

        info!(
            "Rendered {} article pages into {}",
            article_pages.len(),
            self.output_dir.display()
        );

        Ok(SiteSummary {
            index_path,
            article_pages,
        })
    }

    /// Index page listing all articles
    pub fn index_page(&self, articles: &[ProcessedArticle]) -> String {
        let mut items = String::new();
        for processed in articles {
            let article = &processed.article;
            let _ = write!(
                items,
                r#"<li><a href="articles/{slug}.html">{title}</a> {date}<p>{description}</p><span class="term-count">{count} words</span></li>
"#,
                slug = slug_for(article),
                title = escape_html(&article.title),
                date = date_markup(article.published),
                description = escape_html(&truncate_at_char_boundary(
                    &article.description,
                    INDEX_DESCRIPTION_CHARS
                )),
                count = processed.terms.len(),
            );
        }

        let body = if items.is_empty() {
            "<p>No articles yet.</p>".to_string()
        } else {
            format!("<ul class=\"articles\">\n{}</ul>", items)
        };

        self.page(&self.site_title, "style.css", "index.html", &body)
    }

    /// Page for one article: body, vocabulary list, quiz
    pub fn article_page(&self, processed: &ProcessedArticle) -> String {
        let article = &processed.article;
        let mut body = String::new();

        let _ = writeln!(
            body,
            "<article>\n<h1>{}</h1>\n{}",
            escape_html(&article.title),
            date_markup(article.published)
        );

        if let Some(audio) = &article.audio_url {
            let _ = writeln!(
                body,
                r#"<audio controls preload="none" src="{}"></audio>"#,
                escape_html(audio)
            );
        }

        if processed.is_placeholder() {
            let _ = writeln!(
                body,
                r#"<p class="notice">The full text was not available; this page shows the feed summary only. <a href="{}">Read the original</a>.</p>"#,
                escape_html(&article.link)
            );
        }

        let _ = writeln!(body, "{}", render_body(&processed.body, &processed.terms));
        body.push_str("</article>\n");

        body.push_str(&vocabulary_section(&processed.terms));
        body.push_str(&quiz_section(&processed.quiz));

        let _ = write!(
            body,
            r#"<p><a href="{}">Original article</a></p>"#,
            escape_html(&article.link)
        );

        self.page(&article.title, "../style.css", "../index.html", &body)
    }

    fn page(&self, title: &str, css_href: &str, home_href: &str, body: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{css}">
</head>
<body>
<header><a href="{home}">{site}</a></header>
<main>
{body}
</main>
</body>
</html>
"#,
            title = escape_html(title),
            css = css_href,
            home = home_href,
            site = escape_html(&self.site_title),
            body = body,
        )
    }
}

fn date_markup(published: Option<DateTime<Utc>>) -> String {
    match published {
        Some(date) => format!(
            r#"<time datetime="{}">{}</time>"#,
            date.to_rfc3339(),
            date.format("%d.%m.%Y")
        ),
        None => String::new(),
    }
}

/// Vocabulary list grouped by tier, easiest first
fn vocabulary_section(terms: &[VocabularyTerm]) -> String {
    if terms.is_empty() {
        return String::new();
    }

    let mut out = String::from("<section class=\"vocab-list\">\n<h2>Vocabulary</h2>\n");
    for category in Category::ALL {
        let group: Vec<&VocabularyTerm> = terms.iter().filter(|t| t.category == category).collect();
        if group.is_empty() {
            continue;
        }

        let _ = writeln!(
            out,
            "<h3 class=\"vocab-{}\">{}</h3>\n<dl>",
            category.as_str(),
            category.label()
        );
        for term in group {
            let _ = write!(out, "<dt>{}", escape_html(&term.term));
            if !term.part_of_speech.is_empty() {
                let _ = write!(out, " <i class=\"vocab-pos\">{}</i>", escape_html(&term.part_of_speech));
            }
            let _ = write!(out, "</dt><dd>{}", escape_html(&term.gloss));
            if !term.example.is_empty() {
                let _ = write!(out, "<br><q>{}</q>", escape_html(&term.example));
            }
            out.push_str("</dd>\n");
        }
        out.push_str("</dl>\n");
    }
    out.push_str("</section>\n");
    out
}

fn quiz_section(quiz: &[QuizQuestion]) -> String {
    if quiz.is_empty() {
        return String::new();
    }

    let mut out = String::from("<section class=\"quiz\">\n<h2>Quiz</h2>\n");
    for (i, question) in quiz.iter().enumerate() {
        let _ = write!(
            out,
            "<div class=\"quiz-question\">\n<p>{}. {}</p>\n<ol type=\"A\">",
            i + 1,
            escape_html(&question.question)
        );
        for option in &question.options {
            let _ = write!(out, "<li>{}</li>", escape_html(option));
        }
        out.push_str("</ol>\n<details><summary>Show answer</summary>");

        if let Some(correct) = question.correct_option() {
            let _ = write!(
                out,
                "<p class=\"quiz-answer\">{}) {}</p>",
                option_letter(question.answer),
                escape_html(correct)
            );
        }
        if !question.explanation.is_empty() {
            let _ = write!(out, "<p>{}</p>", escape_html(&question.explanation));
        }
        out.push_str("</details>\n</div>\n");
    }
    out.push_str("</section>\n");
    out
}

fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
