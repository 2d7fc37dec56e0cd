//! Shared helper functions for CLI commands
//!
//! Builds the pipeline and the site renderer from the loaded configuration.

use lingocast_core::{
    error::Result,
    render::site::SiteSummary,
    storage::{ArticleStorage, JsonArticleStore},
    AppConfig, GraphqlContentClient, LlmService, Pipeline, RssFeed, SiteRenderer,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Open the article store under the configured data directory
pub fn open_store(config: &AppConfig) -> Result<Arc<JsonArticleStore>> {
    Ok(Arc::new(JsonArticleStore::open(&config.data_dir)?))
}

/// Wire feed, content client, analyzer and store into a pipeline
pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline> {
    config.validate()?;

    let feed = Arc::new(RssFeed::new(config.feed_url.clone())?);
    let content = Arc::new(GraphqlContentClient::new(config.content.clone())?);
    let analyzer = Arc::new(LlmService::new(config.llm.clone())?);
    debug!("Using model {}", analyzer.model());

    let store = open_store(config)?;

    Ok(Pipeline::new(feed, content, analyzer, store)
        .with_rate_limiter(config.rate_limit.build())
        .with_fallback(config.fallback_content))
}

/// Render every stored article into the output directory
pub fn render_site(config: &AppConfig) -> Result<SiteSummary> {
    let store = open_store(config)?;
    let articles = store.load_all()?;

    let renderer = SiteRenderer::new(config.output_dir.clone(), config.site_title.clone());
    let summary = renderer.render(&articles)?;

    info!(
        "Rendered {} article pages to {}",
        summary.article_pages.len(),
        renderer.output_dir().display()
    );
    Ok(summary)
}
