//! Periodic warm cycles while the server is running.

use crate::warmer::CacheWarmer;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

/// Spawns a task running `warm_all` every `every`. The first cycle starts
/// immediately.
pub fn start_warm_scheduler(warmer: CacheWarmer, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Warm scheduler started ({}s interval)", every.as_secs());

        let mut ticker = interval(every);
        // A slow cycle must not be followed by a burst of catch-up cycles
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match warmer.warm_all().await {
                Ok(report) => info!(
                    "Scheduled warm completed: {}/{} pairs refreshed",
                    report.warmed, report.attempted
                ),
                Err(e) => warn!("Scheduled warm failed: {}", e),
            }
        }
    })
}
