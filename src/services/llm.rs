//! LLM service for article analysis
//!
//! Provides integration with Claude for:
//! - Vocabulary extraction (terms, glosses, difficulty tiers, examples)
//! - Comprehension quiz generation
//!
//! Replies are requested as JSON objects. The object is located inside the
//! reply text, so code fences or a sentence of preamble do not break parsing.
//! Individual malformed records are dropped; an unparsable reply is an error.

use crate::error::{LingocastError, Result};
use crate::types::{Category, QuizQuestion, VocabularyTerm};
use crate::utils::string::truncate_at_char_boundary;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Article text beyond this many chars is cut before prompting
const MAX_INPUT_CHARS: usize = 12_000;

/// Analysis the pipeline needs from a language model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleAnalyzer: Send + Sync {
    /// Pick out vocabulary worth explaining to a learner
    async fn extract_vocabulary(&self, text: &str) -> Result<Vec<VocabularyTerm>>;

    /// Write multiple-choice comprehension questions
    async fn generate_quiz(&self, text: &str) -> Result<Vec<QuizQuestion>>;
}

/// Configuration for LLM service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Messages endpoint
    pub api_url: String,

    /// Model to use
    pub model: String,

    /// Max tokens for responses
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-haiku-4-5-20251001".to_string(),
            max_tokens: 4096,
            temperature: 0.3,
        }
    }
}

/// LLM service backed by the Anthropic Messages API
pub struct LlmService {
    config: LlmConfig,
    client: reqwest::Client,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    text: String,
}

/// Vocabulary record as the model writes it
#[derive(Debug, Deserialize)]
struct RawTerm {
    #[serde(default)]
    term: String,
    #[serde(default)]
    gloss: String,
    #[serde(default)]
    category: String,
    #[serde(default, alias = "partOfSpeech")]
    part_of_speech: Option<String>,
    #[serde(default)]
    example: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VocabularyReply {
    #[serde(default, alias = "terms")]
    words: Vec<RawTerm>,
}

/// Quiz record as the model writes it; `answer` may be an index, a letter,
/// or the text of the correct option
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: serde_json::Value,
    #[serde(default)]
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct QuizReply {
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

impl LlmService {
    /// Create a new LLM service with custom config
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LingocastError::Config(config::ConfigError::Message(
                "ANTHROPIC_API_KEY not set".to_string(),
            )));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn call_api(&self, prompt: &str) -> Result<String> {
        debug!("Calling Anthropic API ({})", self.config.model);

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LingocastError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LingocastError::LlmApi(format!("Failed to parse response: {}", e)))?;

        api_response
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| LingocastError::LlmApi("Empty response from API".to_string()))
    }
}

#[async_trait]
impl ArticleAnalyzer for LlmService {
    async fn extract_vocabulary(&self, text: &str) -> Result<Vec<VocabularyTerm>> {
        let prompt = vocabulary_prompt(&truncate_at_char_boundary(text, MAX_INPUT_CHARS));
        let response = self.call_api(&prompt).await?;
        let terms = parse_vocabulary(&response)?;
        debug!("Model returned {} usable terms", terms.len());
        Ok(terms)
    }

    async fn generate_quiz(&self, text: &str) -> Result<Vec<QuizQuestion>> {
        let prompt = quiz_prompt(&truncate_at_char_boundary(text, MAX_INPUT_CHARS));
        let response = self.call_api(&prompt).await?;
        let quiz = parse_quiz(&response)?;
        debug!("Model returned {} usable quiz questions", quiz.len());
        Ok(quiz)
    }
}

fn vocabulary_prompt(text: &str) -> String {
    format!(
        r#"You are helping language learners read a news article.

Article:
{}

Pick 10 to 20 words or short expressions from the article that a learner would want explained.
For each one give:
- "term": the form exactly as it appears in the article (same spelling, same case)
- "gloss": a short English explanation
- "category": one of "beginner", "intermediate", "advanced"
- "part_of_speech": e.g. "noun", "verb", "idiom"
- "example": one short example sentence in the article's language, or ""

Respond with ONLY a JSON object of the form:
{{"words": [{{"term": "...", "gloss": "...", "category": "...", "part_of_speech": "...", "example": "..."}}]}}
"#,
        text
    )
}

fn quiz_prompt(text: &str) -> String {
    format!(
        r#"You are writing a reading-comprehension quiz for language learners.

Article:
{}

Write 5 multiple-choice questions about the article, in the article's language.
Each question has 4 options and exactly one correct answer.

Respond with ONLY a JSON object of the form:
{{"questions": [{{"question": "...", "options": ["...", "...", "...", "..."], "answer": 0, "explanation": "..."}}]}}
where "answer" is the zero-based index of the correct option.
"#,
        text
    )
}

/// Locate the outermost JSON object in a model reply
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

/// Parse a vocabulary reply into validated terms.
///
/// Records with an empty term or an unknown category are dropped, and only the
/// first record for each surface form is kept.
pub fn parse_vocabulary(response: &str) -> Result<Vec<VocabularyTerm>> {
    let json = extract_json_object(response)
        .ok_or_else(|| LingocastError::LlmApi("No JSON object in vocabulary reply".to_string()))?;
    let reply: VocabularyReply = serde_json::from_str(json)
        .map_err(|e| LingocastError::LlmApi(format!("Malformed vocabulary reply: {}", e)))?;

    let mut seen = HashSet::new();
    let mut terms = Vec::with_capacity(reply.words.len());

    for raw in reply.words {
        let surface = raw.term.trim();
        if surface.is_empty() {
            debug!("Dropping vocabulary record without a term");
            continue;
        }
        let category = match raw.category.parse::<Category>() {
            Ok(category) => category,
            Err(_) => {
                debug!("Dropping '{}': unknown category '{}'", surface, raw.category);
                continue;
            }
        };
        if !seen.insert(surface.to_string()) {
            debug!("Dropping duplicate term '{}'", surface);
            continue;
        }

        terms.push(VocabularyTerm {
            term: surface.to_string(),
            gloss: raw.gloss.trim().to_string(),
            category,
            part_of_speech: raw.part_of_speech.unwrap_or_default().trim().to_string(),
            example: raw.example.unwrap_or_default().trim().to_string(),
        });
    }

    Ok(terms)
}

/// Parse a quiz reply, keeping only well-formed questions
pub fn parse_quiz(response: &str) -> Result<Vec<QuizQuestion>> {
    let json = extract_json_object(response)
        .ok_or_else(|| LingocastError::LlmApi("No JSON object in quiz reply".to_string()))?;
    let reply: QuizReply = serde_json::from_str(json)
        .map_err(|e| LingocastError::LlmApi(format!("Malformed quiz reply: {}", e)))?;

    let quiz = reply
        .questions
        .into_iter()
        .filter_map(|raw| {
            let answer = resolve_answer(&raw.answer, &raw.options)?;
            let question = QuizQuestion {
                question: raw.question.trim().to_string(),
                options: raw.options.iter().map(|o| o.trim().to_string()).collect(),
                answer,
                explanation: raw.explanation.trim().to_string(),
            };
            if question.is_valid() {
                Some(question)
            } else {
                debug!("Dropping invalid quiz question '{}'", question.question);
                None
            }
        })
        .collect();

    Ok(quiz)
}

fn resolve_answer(answer: &serde_json::Value, options: &[String]) -> Option<usize> {
    match answer {
        serde_json::Value::Number(n) => n.as_u64().and_then(|i| usize::try_from(i).ok()),
        serde_json::Value::String(s) => {
            let s = s.trim();
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_ascii_alphabetic() => {
                    Some((letter.to_ascii_uppercase() as u8 - b'A') as usize)
                }
                _ => s
                    .parse::<usize>()
                    .ok()
                    .or_else(|| options.iter().position(|o| o.trim() == s)),
            }
        }
        _ => None,
    }
}
