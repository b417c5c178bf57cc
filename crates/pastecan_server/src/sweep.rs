//! Periodic expiry sweep task.

use chrono::Utc;
use pastecan_core::PasteService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the background sweeper.
///
/// Runs independently of request handling; a sweep racing a read is safe, the
/// read either sees the row or gets not-found.
///
/// # Arguments
/// - `service`: Shared paste service.
/// - `period`: Interval between sweeps.
///
/// # Returns
/// Handle of the spawned task; abort it to stop sweeping.
pub fn spawn_expiry_sweeper(service: Arc<PasteService>, period: Duration) -> JoinHandle<()> {
    let period = if period.is_zero() {
        Duration::from_secs(1)
    } else {
        period
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.sweep(Utc::now()) {
                Ok(0) => {}
                Ok(count) => tracing::info!("Expiry sweep removed {} paste(s)", count),
                Err(err) => tracing::error!("Expiry sweep failed: {}", err),
            }
        }
    })
}
