//! Periodic sweeps: overdue bookings and memberships, finished charging,
//! expired QR login sessions.
//!
//! Each sweep runs on its own interval until shutdown. A failing pass is
//! logged and retried on the next tick.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::AppServices;
use crate::domain::DomainResult;
use crate::shared::ShutdownSignal;

/// Seconds between passes of each sweep
#[derive(Debug, Clone)]
pub struct SweepIntervals {
    pub booking_secs: u64,
    pub membership_secs: u64,
    pub charging_secs: u64,
    pub qr_login_secs: u64,
}

impl Default for SweepIntervals {
    fn default() -> Self {
        Self {
            booking_secs: 60,
            membership_secs: 300,
            charging_secs: 60,
            qr_login_secs: 30,
        }
    }
}

/// Run `pass` every `every` until `shutdown` fires.
pub fn spawn_sweep<F, Fut>(
    name: &'static str,
    every: Duration,
    shutdown: ShutdownSignal,
    mut pass: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = DomainResult<usize>> + Send,
{
    tokio::spawn(async move {
        info!(sweep = name, interval_secs = every.as_secs(), "Sweep started");
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match pass().await {
                        Ok(0) => {}
                        Ok(count) => debug!(sweep = name, count, "Sweep pass done"),
                        Err(e) => warn!(sweep = name, error = %e, "Sweep pass failed"),
                    }
                }
                _ = shutdown.notified().wait() => {
                    break;
                }
            }
        }

        info!(sweep = name, "Sweep stopped");
    })
}

/// Start every sweep the service needs.
pub fn start_sweeps(
    services: &AppServices,
    intervals: &SweepIntervals,
    shutdown: &ShutdownSignal,
) -> Vec<JoinHandle<()>> {
    let bookings = services.bookings.clone();
    let memberships = services.memberships.clone();
    let batteries = services.batteries.clone();
    let qr_sessions = services.qr_sessions.clone();

    vec![
        spawn_sweep(
            "booking_expiry",
            Duration::from_secs(intervals.booking_secs.max(1)),
            shutdown.clone(),
            move || {
                let bookings = bookings.clone();
                async move { bookings.expire_overdue(Utc::now()).await }
            },
        ),
        spawn_sweep(
            "membership_expiry",
            Duration::from_secs(intervals.membership_secs.max(1)),
            shutdown.clone(),
            move || {
                let memberships = memberships.clone();
                async move { memberships.expire_overdue(Utc::now()).await }
            },
        ),
        spawn_sweep(
            "charging_completion",
            Duration::from_secs(intervals.charging_secs.max(1)),
            shutdown.clone(),
            move || {
                let batteries = batteries.clone();
                async move { batteries.complete_charging(Utc::now()).await }
            },
        ),
        spawn_sweep(
            "qr_login_eviction",
            Duration::from_secs(intervals.qr_login_secs.max(1)),
            shutdown.clone(),
            move || {
                let evicted = qr_sessions.evict_expired();
                async move { Ok(evicted) }
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn sweep_runs_until_shutdown() {
        let shutdown = ShutdownSignal::new();
        let passes = Arc::new(AtomicUsize::new(0));
        let counter = passes.clone();

        let handle = spawn_sweep("test", Duration::from_secs(10), shutdown.clone(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }
        });

        // First tick fires immediately, then one every 10s.
        tokio::time::sleep(Duration::from_secs(25)).await;
        shutdown.trigger();
        handle.await.unwrap();

        assert_eq!(passes.load(Ordering::SeqCst), 3);
    }
}
