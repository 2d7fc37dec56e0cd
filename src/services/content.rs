//! Article body retrieval over GraphQL
//!
//! The feed only carries a teaser; the full text comes from the publisher's
//! GraphQL endpoint, keyed by the article URL.

use crate::error::{LingocastError, Result};
use crate::types::Article;
use crate::utils::html::html_to_text;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const ARTICLE_QUERY: &str = "query ArticleBody($url: String!) { article(url: $url) { title body } }";

/// Source of full article text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Full plain-text body, paragraphs separated by blank lines
    async fn fetch_body(&self, article: &Article) -> Result<String>;
}

/// Settings for the content endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Optional bearer token
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ArticleData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct ArticleData {
    article: Option<ArticleBody>,
}

#[derive(Debug, Deserialize)]
struct ArticleBody {
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// GraphQL client for article bodies
pub struct GraphqlContentClient {
    config: ContentConfig,
    client: reqwest::Client,
}

impl GraphqlContentClient {
    pub fn new(config: ContentConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(LingocastError::Config(config::ConfigError::Message(
                "content endpoint not set".to_string(),
            )));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl ContentSource for GraphqlContentClient {
    async fn fetch_body(&self, article: &Article) -> Result<String> {
        debug!("Fetching body for {}", article.link);

        let payload = json!({
            "query": ARTICLE_QUERY,
            "variables": { "url": article.link },
        });

        let mut request = self.client.post(&self.config.endpoint).json(&payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(LingocastError::Content(format!(
                "endpoint returned status {} for {}",
                response.status(),
                article.link
            )));
        }

        let raw = response.text().await?;
        parse_body_response(&raw)
    }
}

/// Pull the article body out of a GraphQL response and convert it to plain
/// paragraphs
pub fn parse_body_response(raw: &str) -> Result<String> {
    let response: GraphqlResponse = serde_json::from_str(raw)?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(LingocastError::Content(messages.join("; ")));
    }

    let body = response
        .data
        .and_then(|d| d.article)
        .and_then(|a| a.body)
        .map(|b| html_to_text(&b))
        .unwrap_or_default();

    if body.is_empty() {
        return Err(LingocastError::Content("article body is empty".to_string()));
    }
    Ok(body)
}

/// Stand-in body built from the feed entry when the full text is unavailable
pub fn placeholder_body(article: &Article) -> String {
    let description = article.description.trim();
    if description.is_empty() {
        article.title.trim().to_string()
    } else {
        format!("{}\n\n{}", article.title.trim(), description)
    }
}
