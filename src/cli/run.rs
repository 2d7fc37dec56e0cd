//! One pipeline run, optionally followed by rendering

use lingocast_core::{error::Result, pipeline::ArticleStatus, AppConfig, RunOptions, RunReport};
use tracing::debug;

use super::helpers::{build_pipeline, render_site};

/// Handle the run command
pub async fn handle(
    config: &AppConfig,
    limit: Option<usize>,
    force: bool,
    no_render: bool,
) -> Result<()> {
    let report = execute(config, limit, force).await?;
    print_report(&report);

    if no_render {
        debug!("Skipping site rendering");
        return Ok(());
    }

    let summary = render_site(config)?;
    println!("Site written to {}", summary.index_path.display());
    Ok(())
}

/// Build a pipeline from `config` and run it once
pub async fn execute(config: &AppConfig, limit: Option<usize>, force: bool) -> Result<RunReport> {
    let pipeline = build_pipeline(config)?;
    let options = RunOptions {
        limit: limit.unwrap_or(config.max_articles),
        force,
    };
    pipeline.run(options).await
}

fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        let marker = match outcome.status {
            ArticleStatus::Processed => "✓",
            ArticleStatus::Degraded { .. } => "~",
            ArticleStatus::Failed { .. } => "✗",
        };
        println!("{} {} ({})", marker, outcome.title, outcome.status);
    }
    println!("{}", report);
}
