//! Lingocast - vocabulary-annotated news for language learners
//!
//! Reads a news podcast feed, fetches the full text of each new article,
//! asks a language model for vocabulary explanations and a comprehension
//! quiz, and renders everything into a static website where every explained
//! word carries a tooltip.
//!
//! # Architecture
//!
//! - **Types**: Core data structures (Article, VocabularyTerm, ProcessedArticle)
//! - **Feed / Services**: RSS retrieval, GraphQL full text, LLM analysis
//! - **Storage**: JSON files per processed article, used to skip known articles
//! - **Pipeline**: Sequential per-article orchestration with injectable pacing
//! - **Render**: Vocabulary highlighter and static site writer
//!
//! # Example
//!
//! ```
//! use lingocast_core::render::highlight;
//! use lingocast_core::types::{Category, VocabularyTerm};
//!
//! let terms = vec![VocabularyTerm::new("Bahn", "railway", Category::Beginner)];
//! let html = highlight("Die Bahnhof ist groß. Die Bahn kommt.", &terms);
//!
//! assert!(html.starts_with("Die Bahnhof ist groß. Die <span"));
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod render;
pub mod services;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{LingocastError, Result};
pub use feed::{FeedSource, RssFeed};
pub use pipeline::{FallbackPolicy, Pipeline, RunOptions, RunReport};
pub use render::{highlight, SiteRenderer};
pub use services::{GraphqlContentClient, LlmConfig, LlmService};
pub use storage::{ArticleStorage, JsonArticleStore};
pub use types::{Article, Category, ProcessedArticle, QuizQuestion, VocabularyTerm};
