// Shared fixtures for the integration tests

pub mod scheduler_tests;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::Mutex;

use pricewatch::config::SchedulerConfig;
use pricewatch::fetch::{Availability, PriceFetcher, Quote};
use pricewatch::models::{NewTrackedItem, TrackedItem};
use pricewatch::notify::Notifier;
use pricewatch::storage::Storage;
use pricewatch::{AppError, Result};

pub async fn test_storage() -> Storage {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let storage = Storage::from_pool(pool);
    storage.migrate().await.expect("schema");
    storage
}

pub fn test_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        tick_period_seconds: 1,
        default_check_interval_minutes: 5,
        history_retention_days: 7,
        shutdown_grace_seconds: 2,
    }
}

pub fn tracked(user_id: i64, url: &str, target_price: Option<f64>) -> TrackedItem {
    TrackedItem::new(NewTrackedItem {
        user_id,
        url: url.to_string(),
        target_price,
        cached_name: None,
    })
    .expect("supported marketplace url")
}

/// Fetcher with one scripted outcome per URL; unknown URLs fail.
pub struct ScriptedFetcher {
    outcomes: HashMap<String, (Availability, Option<String>)>,
}

impl ScriptedFetcher {
    pub fn new(outcomes: Vec<(&str, Availability, Option<&str>)>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: outcomes
                .into_iter()
                .map(|(url, availability, name)| {
                    (url.to_string(), (availability, name.map(str::to_string)))
                })
                .collect(),
        })
    }
}

#[async_trait]
impl PriceFetcher for ScriptedFetcher {
    async fn fetch_price(&self, url: &str) -> Result<Quote> {
        match self.outcomes.get(url) {
            Some((availability, name)) => Ok(Quote {
                availability: *availability,
                product_name: name.clone(),
                promo_text: None,
            }),
            None => Err(AppError::Fetch(format!("no scripted outcome for {url}"))),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: i64, message: &str) -> Result<()> {
        self.messages.lock().await.push((user_id, message.to_string()));
        Ok(())
    }
}
