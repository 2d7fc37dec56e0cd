//! Services layer for Lingocast
//!
//! External collaborators the pipeline talks to: the GraphQL content endpoint
//! for full article text and the language model for vocabulary and quizzes.

pub mod content;
pub mod llm;

pub use content::{ContentConfig, ContentSource, GraphqlContentClient};
pub use llm::{ArticleAnalyzer, LlmConfig, LlmService};
