//! JSON file storage
//!
//! One pretty-printed JSON file per processed article under
//! `<data_dir>/articles/article-<id hash>.json`. Writes go through a temporary file and
//! a rename so an interrupted run never leaves a half-written article.

use super::{sort_newest_first, storage_key, ArticleStorage};
use crate::error::Result;
use crate::types::ProcessedArticle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-per-article JSON store
#[derive(Debug, Clone)]
pub struct JsonArticleStore {
    dir: PathBuf,
}

impl JsonArticleStore {
    /// Open (creating if needed) the store below `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("articles");
        fs::create_dir_all(&dir)?;
        debug!("Article store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file an article is stored in
    pub fn path_for(&self, processed: &ProcessedArticle) -> PathBuf {
        self.dir
            .join(format!("{}.json", storage_key(&processed.article)))
    }

    fn read_file(path: &Path) -> Result<ProcessedArticle> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl ArticleStorage for JsonArticleStore {
    fn load_all(&self) -> Result<Vec<ProcessedArticle>> {
        let mut articles = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match Self::read_file(&path) {
                Ok(article) => articles.push(article),
                Err(e) => warn!("Skipping unreadable article file {}: {}", path.display(), e),
            }
        }

        sort_newest_first(&mut articles);
        debug!("Loaded {} stored articles", articles.len());
        Ok(articles)
    }

    fn save(&self, processed: &ProcessedArticle) -> Result<()> {
        let path = self.path_for(processed);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(processed)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        debug!("Stored article '{}' at {}", processed.article.id, path.display());
        Ok(())
    }
}
