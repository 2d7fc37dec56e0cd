//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lingocast_core::{
    error::{LingocastError, Result},
    services::{ArticleAnalyzer, ContentSource},
    types::ContentOrigin,
    Article, Category, FeedSource, ProcessedArticle, QuizQuestion, VocabularyTerm,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Feed article with a fixed date
pub fn sample_article(id: &str, title: &str) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        link: format!("https://news.example/{}", id),
        published: Some(Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()),
        description: format!("Kurzfassung: {}", title),
        audio_url: Some(format!("https://news.example/{}.mp3", id)),
    }
}

/// A small term list covering all categories
pub fn sample_terms() -> Vec<VocabularyTerm> {
    vec![
        VocabularyTerm::new("Bahn", "railway", Category::Beginner).with_part_of_speech("noun"),
        VocabularyTerm::new("Streik", "strike", Category::Intermediate)
            .with_part_of_speech("noun")
            .with_example("Der Streik dauert drei Tage."),
        VocabularyTerm::new("Gewerkschaft", "trade union", Category::Advanced)
            .with_part_of_speech("noun"),
    ]
}

pub fn sample_quiz() -> Vec<QuizQuestion> {
    vec![QuizQuestion {
        question: "Wer streikt?".to_string(),
        options: vec!["Die Piloten".to_string(), "Die Lokführer".to_string()],
        answer: 1,
        explanation: "Die Gewerkschaft der Lokführer ruft zum Streik auf.".to_string(),
    }]
}

pub const SAMPLE_BODY: &str = "Streik der Bahn\n\nDie Gewerkschaft ruft zum Streik auf. Die Bahn fährt kaum.\n\nAm Bahnhof warten viele Menschen.";

/// Processed article built from the sample fixtures
pub fn sample_processed(id: &str, title: &str) -> ProcessedArticle {
    ProcessedArticle {
        article: sample_article(id, title),
        body: SAMPLE_BODY.to_string(),
        content_origin: ContentOrigin::Fetched,
        terms: sample_terms(),
        quiz: sample_quiz(),
        processed_at: Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap(),
    }
}

/// Feed returning a fixed article list
pub struct StaticFeed(pub Vec<Article>);

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        Ok(self.0.clone())
    }
}

/// Content source keyed by article id; unknown ids fail
pub struct StaticContent(pub HashMap<String, String>);

#[async_trait]
impl ContentSource for StaticContent {
    async fn fetch_body(&self, article: &Article) -> Result<String> {
        self.0
            .get(&article.id)
            .cloned()
            .ok_or_else(|| LingocastError::Content(format!("no body for {}", article.id)))
    }
}

/// Analyzer returning the sample terms and quiz, counting calls
#[derive(Default)]
pub struct CannedAnalyzer {
    pub vocabulary_calls: AtomicUsize,
}

impl CannedAnalyzer {
    pub fn calls(&self) -> usize {
        self.vocabulary_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleAnalyzer for CannedAnalyzer {
    async fn extract_vocabulary(&self, _text: &str) -> Result<Vec<VocabularyTerm>> {
        self.vocabulary_calls.fetch_add(1, Ordering::SeqCst);
        Ok(sample_terms())
    }

    async fn generate_quiz(&self, _text: &str) -> Result<Vec<QuizQuestion>> {
        Ok(sample_quiz())
    }
}
