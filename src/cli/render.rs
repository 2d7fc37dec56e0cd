//! Site rendering from stored articles

use lingocast_core::{error::Result, AppConfig};

use super::helpers::render_site;

/// Handle the render command
pub fn handle(config: &AppConfig) -> Result<()> {
    let summary = render_site(config)?;
    println!(
        "{} article pages, index at {}",
        summary.article_pages.len(),
        summary.index_path.display()
    );
    Ok(())
}
