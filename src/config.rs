//! Application configuration
//!
//! Built once at startup and handed to each collaborator by reference.
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <path>`, or `lingocast.toml` in the working directory if present)
//! 3. Environment variables prefixed `LINGOCAST__`, nested with `__`
//!
//! ```toml
//! feed_url = "https://example.org/podcast.xml"
//! output_dir = "site"
//! max_articles = 10
//! fallback_content = "placeholder"
//!
//! [content]
//! endpoint = "https://example.org/graphql"
//!
//! [llm]
//! model = "claude-haiku-4-5-20251001"
//!
//! [rate_limit]
//! strategy = "fixed"
//! delay_ms = 2000
//! ```
//!
//! `ANTHROPIC_API_KEY` fills `llm.api_key` when no other source set it.

use crate::error::{LingocastError, Result};
use crate::pipeline::{FallbackPolicy, RateLimitConfig};
use crate::services::{ContentConfig, LlmConfig};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up in the working directory (any supported extension)
const DEFAULT_CONFIG_NAME: &str = "lingocast";
const ENV_PREFIX: &str = "LINGOCAST";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Complete configuration for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// RSS feed to read
    pub feed_url: String,

    /// Full-text GraphQL endpoint
    pub content: ContentConfig,

    /// Language model settings
    pub llm: LlmConfig,

    /// Where the static site is written
    pub output_dir: PathBuf,

    /// Where processed articles are stored between runs
    pub data_dir: PathBuf,

    /// Most new articles processed per run
    pub max_articles: usize,

    /// Pause policy between articles
    pub rate_limit: RateLimitConfig,

    /// What to do when the full text cannot be fetched
    pub fallback_content: FallbackPolicy,

    /// Shown in page headers
    pub site_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            content: ContentConfig::default(),
            llm: LlmConfig::default(),
            output_dir: PathBuf::from("site"),
            data_dir: default_data_dir(),
            max_articles: 10,
            rate_limit: RateLimitConfig::default(),
            fallback_content: FallbackPolicy::default(),
            site_title: "Lingocast".to_string(),
        }
    }
}

/// Get the default data directory using XDG_DATA_HOME standard
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lingocast")
}

impl AppConfig {
    /// Load from defaults, the config file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                debug!("Reading config from {}", path.display());
                File::from(path).required(true)
            }
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let mut config: AppConfig = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        if config.llm.api_key.is_empty() {
            if let Ok(key) = env::var(API_KEY_VAR) {
                debug!("Using API key from {} environment variable", API_KEY_VAR);
                config.llm.api_key = key;
            }
        }

        Ok(config)
    }

    /// Reject settings no run can work with
    pub fn validate(&self) -> Result<()> {
        if self.feed_url.trim().is_empty() {
            return Err(invalid("feed_url is not set"));
        }
        if self.content.endpoint.trim().is_empty() {
            return Err(invalid("content.endpoint is not set"));
        }
        if self.llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens must be greater than zero"));
        }
        Ok(())
    }

    /// Copy safe to print: secrets reduced to a short prefix
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        copy.llm.api_key = mask(&copy.llm.api_key);
        copy.content.token = copy.content.token.as_deref().map(mask);
        copy
    }
}

fn invalid(msg: &str) -> LingocastError {
    LingocastError::Config(config::ConfigError::Message(msg.to_string()))
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let prefix: String = secret.chars().take(7).collect();
    format!("{}***", prefix)
}
