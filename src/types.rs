//! Core data types for Lingocast
//!
//! This module defines the data structures passed between the pipeline stages:
//! feed articles, the vocabulary terms and quiz questions produced by the
//! language model, and the processed article that gets persisted and rendered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::LingocastError;

/// One item from the podcast feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier (RSS guid, or the link when the feed has no guid)
    pub id: String,

    pub title: String,

    /// Link to the article page; also the key for the content endpoint
    pub link: String,

    /// Publication date, when the feed carries a parsable one
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,

    /// Plain-text teaser from the feed
    #[serde(default)]
    pub description: String,

    /// Episode audio (RSS enclosure)
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Difficulty tier of a vocabulary term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Beginner,
    Intermediate,
    Advanced,
}

impl Category {
    /// All tiers, easiest first
    pub const ALL: [Category; 3] = [
        Category::Beginner,
        Category::Intermediate,
        Category::Advanced,
    ];

    /// Lowercase name, also used as the CSS selector
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beginner => "beginner",
            Category::Intermediate => "intermediate",
            Category::Advanced => "advanced",
        }
    }

    /// Human-readable label for headings
    pub fn label(&self) -> &'static str {
        match self {
            Category::Beginner => "Beginner",
            Category::Intermediate => "Intermediate",
            Category::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LingocastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Category::Beginner),
            "intermediate" => Ok(Category::Intermediate),
            "advanced" => Ok(Category::Advanced),
            other => Err(LingocastError::InvalidInput(format!(
                "unknown category '{}'",
                other
            ))),
        }
    }
}

/// A word or expression the language model picked out of an article
///
/// `term` is matched verbatim against the article text: no case folding
/// and no diacritic stripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTerm {
    pub term: String,
    pub gloss: String,
    pub category: Category,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub example: String,
}

impl VocabularyTerm {
    pub fn new(term: impl Into<String>, gloss: impl Into<String>, category: Category) -> Self {
        Self {
            term: term.into(),
            gloss: gloss.into(),
            category,
            part_of_speech: String::new(),
            example: String::new(),
        }
    }

    pub fn with_part_of_speech(mut self, part_of_speech: impl Into<String>) -> Self {
        self.part_of_speech = part_of_speech.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }
}

/// Multiple-choice comprehension question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// A question needs text, at least two options and an answer in range
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty() && self.options.len() >= 2 && self.answer < self.options.len()
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.answer).map(String::as_str)
    }
}

/// Where an article's body text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOrigin {
    /// Full text from the content endpoint
    Fetched,
    /// Templated stand-in built from the feed entry
    Placeholder,
}

/// An article after the full pipeline ran; the persisted and rendered unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedArticle {
    pub article: Article,
    pub body: String,
    pub content_origin: ContentOrigin,
    #[serde(default)]
    pub terms: Vec<VocabularyTerm>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedArticle {
    pub fn is_placeholder(&self) -> bool {
        self.content_origin == ContentOrigin::Placeholder
    }
}
