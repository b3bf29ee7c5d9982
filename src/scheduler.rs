use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::policy;
use crate::storage::Storage;
use crate::utils::error::Result;
use crate::worker::CheckWorker;

/// The ticking driver. Each tick prunes old history, decides which users
/// are due and spawns one detached `CheckWorker` cycle per due user. The
/// loop never awaits worker completion; a slow user cannot stall the
/// cadence for everyone else.
pub struct PriceScheduler {
    storage: Storage,
    worker: Arc<CheckWorker>,
    config: SchedulerConfig,
}

impl PriceScheduler {
    pub fn new(storage: Storage, worker: Arc<CheckWorker>, config: SchedulerConfig) -> Self {
        Self {
            storage,
            worker,
            config,
        }
    }

    /// Runs until `shutdown` flips to true, then drains: no new workers
    /// are spawned and in-flight ones get a bounded grace period.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            tick_period_seconds = self.config.tick_period_seconds,
            "scheduler started"
        );

        let mut ticker = interval(Duration::from_secs(self.config.tick_period_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut inflight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Reap workers that finished since the last tick.
                    while let Some(joined) = inflight.try_join_next() {
                        if let Err(e) = joined {
                            error!(error = %e, "check worker panicked");
                        }
                    }

                    match self.tick(&mut inflight).await {
                        Ok(spawned) if spawned > 0 => {
                            debug!(spawned, "tick complete");
                        }
                        Ok(_) => {}
                        // A failed tick is a no-op tick; the next one retries.
                        Err(e) => error!(error = %e, "tick failed"),
                    }
                }
                changed = shutdown.changed() => {
                    // A dropped sender counts as a shutdown request too.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.drain(inflight).await;
    }

    /// One pass of the loop's bookkeeping: prune, load, decide, spawn.
    /// `last_check` is updated at spawn time so a hanging worker cannot
    /// make its user permanently due.
    pub async fn tick(&self, inflight: &mut JoinSet<()>) -> Result<usize> {
        let now = Utc::now();

        let cutoff = now - chrono::Duration::days(self.config.history_retention_days);
        match self.storage.prune_history(cutoff).await {
            Ok(removed) if removed > 0 => debug!(removed, "pruned old price history"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "history pruning failed"),
        }

        let items_by_user = self.storage.all_items_by_user().await?;
        let settings = self.storage.all_user_settings().await?;

        let mut spawned = 0;
        for (user_id, items) in items_by_user {
            if items.is_empty() {
                continue;
            }
            if !policy::is_due(
                now,
                settings.get(&user_id),
                self.config.default_check_interval_minutes,
            ) {
                continue;
            }

            if let Err(e) = self.storage.mark_user_checked(user_id, now).await {
                error!(user_id, error = %e, "failed to mark user checked, skipping this cycle");
                continue;
            }

            let worker = Arc::clone(&self.worker);
            inflight.spawn(async move {
                worker.run_user_cycle(user_id, &items).await;
            });
            spawned += 1;
        }

        Ok(spawned)
    }

    async fn drain(&self, mut inflight: JoinSet<()>) {
        if inflight.is_empty() {
            info!("scheduler stopped");
            return;
        }

        info!(
            in_flight = inflight.len(),
            grace_seconds = self.config.shutdown_grace_seconds,
            "draining in-flight check workers"
        );
        let grace = Duration::from_secs(self.config.shutdown_grace_seconds);
        let drained = timeout(grace, async {
            while let Some(joined) = inflight.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "check worker panicked");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                abandoned = inflight.len(),
                "grace period elapsed, abandoning remaining workers"
            );
            inflight.shutdown().await;
        }
        info!("scheduler stopped");
    }
}
