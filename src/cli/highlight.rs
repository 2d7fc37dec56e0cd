//! Highlight a text against a term list, for checking annotations by hand

use lingocast_core::{
    error::{LingocastError, Result},
    render::highlight::render_body,
    VocabularyTerm,
};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Handle the highlight command
///
/// `terms_path` holds a JSON array of vocabulary terms. The text is read
/// from `input`, or from stdin when no file is given.
pub fn handle(terms_path: &Path, input: Option<&Path>) -> Result<()> {
    let raw_terms = std::fs::read_to_string(terms_path)?;
    let terms: Vec<VocabularyTerm> = serde_json::from_str(&raw_terms)?;
    debug!("Loaded {} terms from {}", terms.len(), terms_path.display());

    let text = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Err(LingocastError::InvalidInput("No text to highlight".to_string()));
    }

    println!("{}", render_body(&text, &terms));
    Ok(())
}
