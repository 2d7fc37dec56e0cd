//! Repeated runs on a fixed interval

use lingocast_core::{
    error::{LingocastError, Result},
    AppConfig,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::{helpers::render_site, run::execute};

/// Handle the watch command
///
/// A failed run is logged and the loop carries on. Ctrl-C stops it, also in
/// the middle of a run.
pub async fn handle(config: &AppConfig, interval_minutes: u64, limit: Option<usize>) -> Result<()> {
    if interval_minutes == 0 {
        return Err(LingocastError::InvalidInput(
            "Interval must be at least one minute".to_string(),
        ));
    }
    config.validate()?;

    info!("Watching feed every {} minutes", interval_minutes);

    let runs = watch_loop(
        Duration::from_secs(interval_minutes * 60),
        || run_and_render(config, limit),
        interrupted(),
    )
    .await;

    info!("Stopped after {} runs", runs);
    Ok(())
}

/// Completes on the first Ctrl-C
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run_and_render(config: &AppConfig, limit: Option<usize>) {
    match execute(config, limit, false).await {
        Ok(report) => {
            info!("{}", report);
            if report.stored() > 0 {
                if let Err(e) = render_site(config) {
                    error!("Rendering failed: {}", e);
                }
            }
        }
        Err(e) => error!("Run failed: {}", e),
    }
}

/// Start `run_once` on every tick until `shutdown` completes. A shutdown
/// during a run cancels that run. Returns the number of runs started.
async fn watch_loop<F, Fut>(
    period: Duration,
    mut run_once: F,
    shutdown: impl Future<Output = ()>,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut runs = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }

        runs += 1;
        tokio::select! {
            _ = run_once() => {}
            _ = &mut shutdown => {
                info!("Interrupted during a run, stopping");
                break;
            }
        }
    }

    runs
}
