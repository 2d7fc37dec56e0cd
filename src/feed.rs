//! Podcast feed retrieval
//!
//! Fetches the RSS feed and turns each `<item>` into an [`Article`]. Parsing
//! is pattern-based and tolerant: items missing a title or any identifier are
//! skipped, everything else is optional.

use crate::error::{LingocastError, Result};
use crate::types::Article;
use crate::utils::html::{decode_entities, html_to_text, unwrap_cdata};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Source of feed articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Articles in feed order
    async fn fetch_articles(&self) -> Result<Vec<Article>>;
}

static ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>").expect("Valid item regex"));

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<title\b[^>]*>(.*?)</title>").expect("Valid title regex"));

static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<link>(.*?)</link>").expect("Valid link regex"));

static GUID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<guid\b[^>]*>(.*?)</guid>").expect("Valid guid regex"));

static PUB_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<pubDate>(.*?)</pubDate>").expect("Valid pubDate regex"));

static DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<description\b[^>]*>(.*?)</description>").expect("Valid description regex")
});

static ENCLOSURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<enclosure\b[^>]*?\burl\s*=\s*["']([^"']+)["']"#).expect("Valid enclosure regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Valid whitespace regex"));

/// RSS feed fetched over HTTP
pub struct RssFeed {
    url: String,
    client: reqwest::Client,
}

impl RssFeed {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(LingocastError::Config(config::ConfigError::Message(
                "feed URL not set".to_string(),
            )));
        }

        Ok(Self {
            url,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl FeedSource for RssFeed {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        debug!("Fetching feed {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(LingocastError::Feed(format!(
                "{} returned status {}",
                self.url,
                response.status()
            )));
        }

        let xml = response.text().await?;
        let articles = parse_feed(&xml)?;
        info!("Feed lists {} articles", articles.len());
        Ok(articles)
    }
}

/// Parse an RSS document into articles, in document order
pub fn parse_feed(xml: &str) -> Result<Vec<Article>> {
    if !xml.contains("<rss") && !xml.contains("<channel") {
        return Err(LingocastError::Feed("document is not an RSS feed".to_string()));
    }

    Ok(ITEM
        .captures_iter(xml)
        .filter_map(|caps| parse_item(&caps[1]))
        .collect())
}

fn parse_item(item: &str) -> Option<Article> {
    let title = field(&TITLE, item).filter(|t| !t.is_empty());
    let link = field(&LINK, item).unwrap_or_default();
    let guid = field(&GUID, item).filter(|g| !g.is_empty());

    let Some(title) = title else {
        debug!("Skipping feed item without a title");
        return None;
    };

    let id = match guid {
        Some(guid) => guid,
        None if !link.is_empty() => link.clone(),
        None => {
            debug!("Skipping feed item '{}' without guid or link", title);
            return None;
        }
    };

    let published = field(&PUB_DATE, item).and_then(|raw| match parse_pub_date(&raw) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!("Ignoring unparsable pubDate '{}': {}", raw, e);
            None
        }
    });

    let description = DESCRIPTION
        .captures(item)
        .map(|caps| plain_text(&caps[1]))
        .unwrap_or_default();

    let audio_url = ENCLOSURE
        .captures(item)
        .map(|caps| decode_entities(&caps[1]));

    Some(Article {
        id,
        title,
        link,
        published,
        description,
        audio_url,
    })
}

/// Text content of the first match of a single-element pattern
fn field(pattern: &Regex, item: &str) -> Option<String> {
    pattern
        .captures(item)
        .map(|caps| decode_entities(unwrap_cdata(&caps[1]).trim()))
}

/// Description markup to one line of text. The HTML is either in a CDATA
/// section or entity-escaped; the escaping is undone exactly once.
fn plain_text(raw: &str) -> String {
    let html = if raw.contains("<![CDATA[") {
        unwrap_cdata(raw)
    } else {
        decode_entities(raw)
    };
    WHITESPACE
        .replace_all(html_to_text(&html).trim(), " ")
        .into_owned()
}

/// RFC 2822 date as used by RSS `pubDate`
pub fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc2822(raw.trim())?.with_timezone(&Utc))
}
