use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::compose::{NotificationEntry, compose_batch};
use crate::fetch::{Availability, PriceFetcher};
use crate::models::TrackedItem;
use crate::notify::Notifier;
use crate::storage::Storage;

/// What one check cycle did. Mostly useful for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub items_checked: usize,
    pub fetch_failures: usize,
    pub out_of_stock: usize,
    pub notified: usize,
    pub delivered: bool,
}

/// Checks all tracked items of a single user and sends one batched
/// notification. Per-item failures are isolated: a failed fetch skips
/// that item and never aborts the rest of the cycle.
pub struct CheckWorker {
    storage: Storage,
    fetcher: Arc<dyn PriceFetcher>,
    notifier: Arc<dyn Notifier>,
}

impl CheckWorker {
    pub fn new(storage: Storage, fetcher: Arc<dyn PriceFetcher>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            storage,
            fetcher,
            notifier,
        }
    }

    /// Runs one full cycle for a user. Never propagates an error: every
    /// failure mode is logged here so a worker can run as a detached
    /// task without crashing the scheduler loop.
    pub async fn run_user_cycle(&self, user_id: i64, items: &[TrackedItem]) -> CycleSummary {
        info!(user_id, items = items.len(), "starting check cycle");
        let mut summary = CycleSummary {
            items_checked: items.len(),
            ..CycleSummary::default()
        };
        let mut entries = Vec::new();

        for item in items {
            let quote = match self.fetcher.fetch_price(&item.url).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!(user_id, url = %item.url, error = %e, "price fetch failed, skipping item");
                    summary.fetch_failures += 1;
                    continue;
                }
            };

            let price = match quote.availability {
                Availability::OutOfStock => {
                    debug!(user_id, url = %item.url, "item out of stock");
                    summary.out_of_stock += 1;
                    continue;
                }
                Availability::InStock(price) => price,
            };

            if let Err(e) = self.storage.append_price(&item.url, price, Utc::now()).await {
                error!(user_id, url = %item.url, error = %e, "failed to record price history");
            }

            // Notify when no target is set, or the price reached it.
            if item.target_price.is_none_or(|target| price <= target) {
                entries.push(NotificationEntry {
                    site: item.site,
                    display_name: item.display_name(quote.product_name.as_deref()),
                    price,
                    url: item.url.clone(),
                    target_price: item.target_price,
                });
            }
        }

        if entries.is_empty() {
            debug!(user_id, "no items to notify about");
            return summary;
        }

        summary.notified = entries.len();
        let message = compose_batch(&entries);
        match self.notifier.notify(user_id, &message).await {
            Ok(()) => {
                info!(user_id, entries = entries.len(), "batched notification sent");
                summary.delivered = true;
            }
            Err(e) => {
                // Best-effort delivery: the cycle still counts as done.
                warn!(user_id, error = %e, "notification delivery failed");
            }
        }

        summary
    }
}
