//! Storage layer for processed articles
//!
//! Provides the storage abstraction used by the pipeline and the JSON file
//! implementation. Incremental runs rely on it to skip articles that were
//! already processed.

pub mod json;

pub use json::JsonArticleStore;

use crate::error::Result;
use crate::types::{Article, ProcessedArticle};
use crate::utils::string::slugify;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Longest title part of a slug, in bytes
const SLUG_TITLE_LEN: usize = 60;

/// Storage backend trait for processed articles
pub trait ArticleStorage: Send + Sync {
    /// Every stored article, newest first
    fn load_all(&self) -> Result<Vec<ProcessedArticle>>;

    /// Persist one processed article, replacing an earlier version
    fn save(&self, processed: &ProcessedArticle) -> Result<()>;

    /// Identifiers of all stored articles
    fn known_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|p| p.article.id)
            .collect())
    }

    /// Keep only the feed articles that are not stored yet
    fn filter_new(&self, articles: Vec<Article>) -> Result<Vec<Article>> {
        let known = self.known_ids()?;
        Ok(articles
            .into_iter()
            .filter(|a| !known.contains(&a.id))
            .collect())
    }
}

/// Stable file and URL name for an article.
///
/// Title slug plus the first 8 hex digits of the SHA-256 of the article id, so
/// two articles with the same title still get distinct pages.
pub fn slug_for(article: &Article) -> String {
    let hash = id_hash(&article.id, 4);

    let title = slugify(&article.title, SLUG_TITLE_LEN);
    if title.is_empty() {
        format!("article-{}", hash)
    } else {
        format!("{}-{}", title, hash)
    }
}

/// Storage file name for an article. Depends on the id only, so a retitled
/// article still maps to the same file.
pub fn storage_key(article: &Article) -> String {
    format!("article-{}", id_hash(&article.id, 8))
}

/// Hex of the first `bytes` bytes of the SHA-256 of an article id
fn id_hash(id: &str, bytes: usize) -> String {
    let digest = Sha256::digest(id.as_bytes());
    digest[..bytes].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Order articles newest first; undated articles go last, by processing time
pub fn sort_newest_first(articles: &mut [ProcessedArticle]) {
    articles.sort_by(|a, b| {
        b.article
            .published
            .cmp(&a.article.published)
            .then_with(|| b.processed_at.cmp(&a.processed_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentOrigin;
    use chrono::{TimeZone, Utc};

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            link: format!("https://example.org/{}", id),
            published: None,
            description: String::new(),
            audio_url: None,
        }
    }

    #[test]
    fn test_slug_is_stable_and_distinct() {
        let a = article("guid-1", "Die Lage in Europa");
        let b = article("guid-2", "Die Lage in Europa");

        assert_eq!(slug_for(&a), slug_for(&a));
        assert_ne!(slug_for(&a), slug_for(&b));
        assert!(slug_for(&a).starts_with("die-lage-in-europa-"));
        assert_eq!(slug_for(&a).len(), "die-lage-in-europa-".len() + 8);
    }

    #[test]
    fn test_storage_key_ignores_title() {
        let before = article("guid-1", "Die Lage in Europa");
        let after = article("guid-1", "Neue Lage in Europa");

        assert_eq!(storage_key(&before), storage_key(&after));
        assert_ne!(storage_key(&before), storage_key(&article("guid-2", "Die Lage in Europa")));
        assert_eq!(storage_key(&before).len(), "article-".len() + 16);
    }

    #[test]
    fn test_slug_without_title() {
        let slug = slug_for(&article("guid-1", "???"));
        assert!(slug.starts_with("article-"));
        assert_eq!(slug.len(), "article-".len() + 8);
    }

    #[test]
    fn test_sort_newest_first() {
        let processed = |id: &str, day: Option<u32>| ProcessedArticle {
            article: Article {
                published: day.map(|d| Utc.with_ymd_and_hms(2024, 3, d, 8, 0, 0).unwrap()),
                ..article(id, id)
            },
            body: String::new(),
            content_origin: ContentOrigin::Fetched,
            terms: vec![],
            quiz: vec![],
            processed_at: Utc::now(),
        };

        let mut items = vec![
            processed("old", Some(1)),
            processed("undated", None),
            processed("new", Some(9)),
        ];
        sort_newest_first(&mut items);

        let ids: Vec<&str> = items.iter().map(|p| p.article.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }
}
