use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;

use pricewatch::config::AppConfig;
use pricewatch::fetch::HttpPriceFetcher;
use pricewatch::notify::TelegramNotifier;
use pricewatch::scheduler::PriceScheduler;
use pricewatch::storage::Storage;
use pricewatch::worker::CheckWorker;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pricewatch=debug".parse()?),
        )
        .init();

    info!("Starting Pricewatch...");
    let config = AppConfig::from_env()?;

    let storage = Storage::connect(&config.database).await?;
    storage.migrate().await?;

    let fetcher = Arc::new(HttpPriceFetcher::new(&config.fetcher)?);
    let notifier = Arc::new(TelegramNotifier::new(&config.telegram));
    let worker = Arc::new(CheckWorker::new(storage.clone(), fetcher, notifier));

    let scheduler = PriceScheduler::new(storage, worker, config.scheduler.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    shutdown_tx.send(true)?;
    scheduler_handle.await?;

    Ok(())
}
