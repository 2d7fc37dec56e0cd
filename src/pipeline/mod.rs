//! Article pipeline
//!
//! One run: read the feed, drop articles that were already processed, then
//! take each remaining article through content retrieval, vocabulary
//! extraction and quiz generation, and persist the result.
//!
//! Articles are processed strictly one after another, with a permit from the
//! injected [`RateLimiter`] before each. Every article produces an
//! [`ArticleOutcome`]; a failing article never stops the batch.

pub mod rate_limit;

pub use rate_limit::{
    FixedDelay, RateLimitConfig, RateLimitStrategy, RateLimiter, TokenBucket, Unlimited,
};

use crate::error::Result;
use crate::feed::FeedSource;
use crate::services::content::{placeholder_body, ContentSource};
use crate::services::llm::ArticleAnalyzer;
use crate::storage::ArticleStorage;
use crate::types::{Article, ContentOrigin, ProcessedArticle};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Behaviour when an article's full text cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Continue with a body built from the feed entry; the article is
    /// reported as degraded and its page carries a notice
    #[default]
    Placeholder,
    /// Fail the article; it is not stored and will be retried next run
    Fail,
}

/// How one article fared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleStatus {
    Processed,
    /// Stored, but with reduced content
    Degraded { reason: String },
    /// Not stored
    Failed { error: String },
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleStatus::Processed => write!(f, "processed"),
            ArticleStatus::Degraded { reason } => write!(f, "degraded ({})", reason),
            ArticleStatus::Failed { error } => write!(f, "failed ({})", error),
        }
    }
}

/// Result for one article of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleOutcome {
    pub article_id: String,
    pub title: String,
    pub status: ArticleStatus,
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Articles listed in the feed
    pub feed_total: usize,
    /// Articles dropped because they were already stored
    pub skipped_known: usize,
    /// One entry per attempted article, in processing order
    pub outcomes: Vec<ArticleOutcome>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, ArticleStatus::Processed))
    }

    pub fn degraded(&self) -> usize {
        self.count(|s| matches!(s, ArticleStatus::Degraded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ArticleStatus::Failed { .. }))
    }

    /// Articles that ended up stored
    pub fn stored(&self) -> usize {
        self.processed() + self.degraded()
    }

    fn count(&self, pred: impl Fn(&ArticleStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in feed, {} already known, {} processed, {} degraded, {} failed",
            self.feed_total,
            self.skipped_known,
            self.processed(),
            self.degraded(),
            self.failed()
        )
    }
}

/// Per-run options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Most articles to attempt
    pub limit: usize,
    /// Reprocess articles that are already stored
    pub force: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            force: false,
        }
    }
}

/// Sequential article pipeline
pub struct Pipeline {
    feed: Arc<dyn FeedSource>,
    content: Arc<dyn ContentSource>,
    analyzer: Arc<dyn ArticleAnalyzer>,
    store: Arc<dyn ArticleStorage>,
    limiter: Arc<dyn RateLimiter>,
    fallback: FallbackPolicy,
}

impl Pipeline {
    /// Pipeline without pacing and with placeholder fallback
    pub fn new(
        feed: Arc<dyn FeedSource>,
        content: Arc<dyn ContentSource>,
        analyzer: Arc<dyn ArticleAnalyzer>,
        store: Arc<dyn ArticleStorage>,
    ) -> Self {
        Self {
            feed,
            content,
            analyzer,
            store,
            limiter: Arc::new(Unlimited),
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Run once. Only a feed or store read failure is returned as an error;
    /// per-article problems end up in the report.
    pub async fn run(&self, options: RunOptions) -> Result<RunReport> {
        let articles = self.feed.fetch_articles().await?;
        let feed_total = articles.len();

        let candidates = if options.force {
            articles
        } else {
            self.store.filter_new(articles)?
        };
        let skipped_known = feed_total - candidates.len();

        info!(
            "{} new of {} feed articles, processing up to {}",
            candidates.len(),
            feed_total,
            options.limit
        );

        let mut outcomes = Vec::new();
        for article in candidates.into_iter().take(options.limit) {
            self.limiter.acquire().await;

            let status = match self.process(&article).await {
                Ok(reasons) if reasons.is_empty() => {
                    info!("Processed '{}'", article.title);
                    ArticleStatus::Processed
                }
                Ok(reasons) => {
                    let reason = reasons.join("; ");
                    warn!("Processed '{}' with reduced content: {}", article.title, reason);
                    ArticleStatus::Degraded { reason }
                }
                Err(e) => {
                    error!("Failed to process '{}': {}", article.title, e);
                    ArticleStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };

            outcomes.push(ArticleOutcome {
                article_id: article.id,
                title: article.title,
                status,
            });
        }

        let report = RunReport {
            feed_total,
            skipped_known,
            outcomes,
        };
        info!("Run finished: {}", report);
        Ok(report)
    }

    /// Take one article through all stages and store it. Returns the reasons
    /// the result is degraded, empty when it is complete.
    async fn process(&self, article: &Article) -> Result<Vec<String>> {
        let mut degraded = Vec::new();

        let (body, content_origin) = match self.content.fetch_body(article).await {
            Ok(body) => (body, ContentOrigin::Fetched),
            Err(e) => match self.fallback {
                FallbackPolicy::Placeholder => {
                    warn!(
                        "Full text unavailable for '{}', using feed summary: {}",
                        article.title, e
                    );
                    degraded.push(format!("full text unavailable: {}", e));
                    (placeholder_body(article), ContentOrigin::Placeholder)
                }
                FallbackPolicy::Fail => return Err(e),
            },
        };

        let terms = self.analyzer.extract_vocabulary(&body).await?;
        debug!("{} vocabulary terms for '{}'", terms.len(), article.title);

        let quiz = match self.analyzer.generate_quiz(&body).await {
            Ok(quiz) => quiz,
            Err(e) => {
                warn!("Quiz generation failed for '{}': {}", article.title, e);
                degraded.push(format!("no quiz: {}", e));
                Vec::new()
            }
        };

        let processed = ProcessedArticle {
            article: article.clone(),
            body,
            content_origin,
            terms,
            quiz,
            processed_at: Utc::now(),
        };
        self.store.save(&processed)?;

        Ok(degraded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LingocastError;
    use crate::feed::MockFeedSource;
    use crate::services::content::MockContentSource;
    use crate::services::llm::MockArticleAnalyzer;
    use crate::storage::JsonArticleStore;
    use crate::types::{Category, QuizQuestion, VocabularyTerm};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Artikel {}", id),
            link: format!("https://example.org/{}", id),
            published: None,
            description: format!("Zusammenfassung {}", id),
            audio_url: None,
        }
    }

    fn feed_of(ids: &'static [&'static str]) -> MockFeedSource {
        let mut feed = MockFeedSource::new();
        feed.expect_fetch_articles()
            .returning(move || Ok(ids.iter().map(|id| article(id)).collect()));
        feed
    }

    fn content_ok() -> MockContentSource {
        let mut content = MockContentSource::new();
        content
            .expect_fetch_body()
            .returning(|a: &Article| Ok(format!("Die Bahn kommt. ({})", a.id)));
        content
    }

    fn analyzer_ok() -> MockArticleAnalyzer {
        let mut analyzer = MockArticleAnalyzer::new();
        analyzer
            .expect_extract_vocabulary()
            .returning(|_: &str| Ok(vec![VocabularyTerm::new("Bahn", "train", Category::Beginner)]));
        analyzer.expect_generate_quiz().returning(|_: &str| {
            Ok(vec![QuizQuestion {
                question: "Was kommt?".to_string(),
                options: vec!["Die Bahn".to_string(), "Der Bus".to_string()],
                answer: 0,
                explanation: String::new(),
            }])
        });
        analyzer
    }

    fn store(dir: &TempDir) -> Arc<JsonArticleStore> {
        Arc::new(JsonArticleStore::open(dir.path()).unwrap())
    }

    fn pipeline(
        feed: MockFeedSource,
        content: MockContentSource,
        analyzer: MockArticleAnalyzer,
        store: Arc<JsonArticleStore>,
    ) -> Pipeline {
        Pipeline::new(Arc::new(feed), Arc::new(content), Arc::new(analyzer), store)
    }

    #[tokio::test]
    async fn test_processes_new_articles() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let p = pipeline(feed_of(&["a", "b"]), content_ok(), analyzer_ok(), store.clone());

        let report = p.run(RunOptions::default()).await.unwrap();

        assert_eq!(report.feed_total, 2);
        assert_eq!(report.processed(), 2);
        assert_eq!(report.skipped_known, 0);

        let stored = store.load_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|p| p.terms.len() == 1 && p.quiz.len() == 1));
        assert!(stored.iter().all(|p| p.content_origin == ContentOrigin::Fetched));
    }

    #[tokio::test]
    async fn test_skips_known_articles_unless_forced() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let first = pipeline(feed_of(&["a"]), content_ok(), analyzer_ok(), store.clone());
        first.run(RunOptions::default()).await.unwrap();

        let second = pipeline(feed_of(&["a", "b"]), content_ok(), analyzer_ok(), store.clone());
        let report = second.run(RunOptions::default()).await.unwrap();
        assert_eq!(report.skipped_known, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].article_id, "b");

        let forced = pipeline(feed_of(&["a", "b"]), content_ok(), analyzer_ok(), store.clone());
        let report = forced
            .run(RunOptions {
                force: true,
                ..RunOptions::default()
            })
            .await
            .unwrap();
        assert_eq!(report.skipped_known, 0);
        assert_eq!(report.processed(), 2);
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_limit_caps_attempts() {
        let dir = TempDir::new().unwrap();
        let p = pipeline(feed_of(&["a", "b", "c"]), content_ok(), analyzer_ok(), store(&dir));

        let report = p
            .run(RunOptions {
                limit: 2,
                force: false,
            })
            .await
            .unwrap();

        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.article_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_content_failure_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut content = MockContentSource::new();
        content.expect_fetch_body().returning(|a: &Article| {
            if a.id == "b" {
                Err(LingocastError::Content("timeout".to_string()))
            } else {
                Ok("Volltext.".to_string())
            }
        });

        let p = pipeline(feed_of(&["a", "b"]), content, analyzer_ok(), store.clone());
        let report = p.run(RunOptions::default()).await.unwrap();

        assert_eq!(report.processed(), 1);
        assert_eq!(report.degraded(), 1);
        match &report.outcomes[1].status {
            ArticleStatus::Degraded { reason } => assert!(reason.contains("timeout")),
            other => panic!("unexpected status {:?}", other),
        }

        let placeholder = store
            .load_all()
            .unwrap()
            .into_iter()
            .find(|p| p.article.id == "b")
            .unwrap();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.body, "Artikel b\n\nZusammenfassung b");
    }

    #[tokio::test]
    async fn test_content_failure_with_fail_policy() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut content = MockContentSource::new();
        content.expect_fetch_body().returning(|a: &Article| {
            if a.id == "a" {
                Err(LingocastError::Content("gone".to_string()))
            } else {
                Ok("Volltext.".to_string())
            }
        });

        let p = pipeline(feed_of(&["a", "b"]), content, analyzer_ok(), store.clone())
            .with_fallback(FallbackPolicy::Fail);
        let report = p.run(RunOptions::default()).await.unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.processed(), 1);
        assert!(matches!(report.outcomes[0].status, ArticleStatus::Failed { .. }));

        // The failed article is not stored, so the next run retries it
        assert_eq!(store.filter_new(vec![article("a")]).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_vocabulary_failure_fails_article_but_not_batch() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut analyzer = MockArticleAnalyzer::new();
        analyzer.expect_extract_vocabulary().returning(|text: &str| {
            if text.contains("(a)") {
                Err(LingocastError::LlmApi("overloaded".to_string()))
            } else {
                Ok(vec![])
            }
        });
        analyzer.expect_generate_quiz().returning(|_: &str| Ok(vec![]));

        let p = pipeline(feed_of(&["a", "b"]), content_ok(), analyzer, store.clone());
        let report = p.run(RunOptions::default()).await.unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.processed(), 1);
        assert_eq!(report.stored(), 1);
        assert_eq!(store.load_all().unwrap()[0].article.id, "b");
    }

    #[tokio::test]
    async fn test_quiz_failure_degrades() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut analyzer = MockArticleAnalyzer::new();
        analyzer
            .expect_extract_vocabulary()
            .returning(|_: &str| Ok(vec![VocabularyTerm::new("Bahn", "train", Category::Beginner)]));
        analyzer
            .expect_generate_quiz()
            .returning(|_: &str| Err(LingocastError::LlmApi("bad json".to_string())));

        let p = pipeline(feed_of(&["a"]), content_ok(), analyzer, store.clone());
        let report = p.run(RunOptions::default()).await.unwrap();

        assert_eq!(report.degraded(), 1);
        let stored = store.load_all().unwrap();
        assert_eq!(stored[0].terms.len(), 1);
        assert!(stored[0].quiz.is_empty());
    }

    #[tokio::test]
    async fn test_feed_failure_aborts_run() {
        let dir = TempDir::new().unwrap();
        let mut feed = MockFeedSource::new();
        feed.expect_fetch_articles()
            .returning(|| Err(LingocastError::Feed("503".to_string())));

        let mut content = MockContentSource::new();
        content.expect_fetch_body().never();

        let p = pipeline(feed, content, MockArticleAnalyzer::new(), store(&dir));
        assert!(matches!(
            p.run(RunOptions::default()).await,
            Err(LingocastError::Feed(_))
        ));
    }

    struct CountingLimiter(AtomicUsize);

    #[async_trait]
    impl RateLimiter for CountingLimiter {
        async fn acquire(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_limiter_acquired_once_per_article() {
        let dir = TempDir::new().unwrap();
        let limiter = Arc::new(CountingLimiter(AtomicUsize::new(0)));

        let p = pipeline(feed_of(&["a", "b", "c"]), content_ok(), analyzer_ok(), store(&dir))
            .with_rate_limiter(limiter.clone());
        p.run(RunOptions::default()).await.unwrap();

        assert_eq!(limiter.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_report_display() {
        let report = RunReport {
            feed_total: 3,
            skipped_known: 1,
            outcomes: vec![
                ArticleOutcome {
                    article_id: "a".to_string(),
                    title: "A".to_string(),
                    status: ArticleStatus::Processed,
                },
                ArticleOutcome {
                    article_id: "b".to_string(),
                    title: "B".to_string(),
                    status: ArticleStatus::Failed {
                        error: "x".to_string(),
                    },
                },
            ],
        };
        assert_eq!(
            report.to_string(),
            "3 in feed, 1 already known, 1 processed, 0 degraded, 1 failed"
        );
    }
}
