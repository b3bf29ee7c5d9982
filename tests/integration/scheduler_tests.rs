use super::*;

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::timeout;

use pricewatch::fetch::Availability;
use pricewatch::scheduler::PriceScheduler;
use pricewatch::worker::CheckWorker;

const URL_A: &str = "https://www.ozon.ru/product/a/";
const URL_B: &str = "https://www.wildberries.ru/catalog/b/detail.aspx";
const URL_C: &str = "https://www.ozon.ru/product/c/";

async fn drain(inflight: &mut JoinSet<()>) {
    while let Some(joined) = inflight.join_next().await {
        joined.expect("worker must not panic");
    }
}

#[tokio::test]
async fn test_tick_spawns_only_due_users() -> anyhow::Result<()> {
    let storage = test_storage().await;
    storage.upsert_item(&tracked(1, URL_A, None)).await?;
    storage.upsert_item(&tracked(2, URL_C, None)).await?;
    // User 2 was just checked, so with the 5-minute default they are not due
    storage.mark_user_checked(2, Utc::now()).await?;

    let fetcher = ScriptedFetcher::new(vec![
        (URL_A, Availability::InStock(1200.0), Some("Kettle")),
        (URL_C, Availability::InStock(300.0), None),
    ]);
    let notifier = std::sync::Arc::new(RecordingNotifier::default());
    let worker = std::sync::Arc::new(CheckWorker::new(
        storage.clone(),
        fetcher,
        notifier.clone(),
    ));
    let scheduler = PriceScheduler::new(storage.clone(), worker, test_scheduler_config());

    let mut inflight = JoinSet::new();
    let spawned = scheduler.tick(&mut inflight).await?;
    assert_eq!(spawned, 1);
    drain(&mut inflight).await;

    // Only user 1 was checked
    assert_eq!(storage.price_history(URL_A).await?.len(), 1);
    assert!(storage.price_history(URL_C).await?.is_empty());

    let messages = notifier.messages.lock().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, 1);

    // Spawning recorded the check time, so user 1 is no longer due either
    let settings = storage.all_user_settings().await?;
    assert!(settings[&1].last_check.is_some());
    Ok(())
}

#[tokio::test]
async fn test_tick_honors_interval_override() -> anyhow::Result<()> {
    let storage = test_storage().await;
    storage.upsert_item(&tracked(1, URL_A, None)).await?;
    storage.upsert_item(&tracked(2, URL_C, None)).await?;

    // Both users were checked two minutes ago; user 1 overrides the
    // interval down to one minute, user 2 up to an hour.
    let two_minutes_ago = Utc::now() - Duration::minutes(2);
    storage.set_check_interval(1, 1).await?;
    storage.mark_user_checked(1, two_minutes_ago).await?;
    storage.set_check_interval(2, 60).await?;
    storage.mark_user_checked(2, two_minutes_ago).await?;

    let fetcher = ScriptedFetcher::new(vec![
        (URL_A, Availability::InStock(100.0), None),
        (URL_C, Availability::InStock(200.0), None),
    ]);
    let notifier = std::sync::Arc::new(RecordingNotifier::default());
    let worker = std::sync::Arc::new(CheckWorker::new(
        storage.clone(),
        fetcher,
        notifier.clone(),
    ));
    let scheduler = PriceScheduler::new(storage.clone(), worker, test_scheduler_config());

    let mut inflight = JoinSet::new();
    let spawned = scheduler.tick(&mut inflight).await?;
    assert_eq!(spawned, 1);
    drain(&mut inflight).await;

    assert_eq!(storage.price_history(URL_A).await?.len(), 1);
    assert!(storage.price_history(URL_C).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mixed_batch_one_message_two_history_rows() -> anyhow::Result<()> {
    let storage = test_storage().await;
    storage.upsert_item(&tracked(42, URL_A, None)).await?;
    storage.upsert_item(&tracked(42, URL_B, Some(500.0))).await?;

    let fetcher = ScriptedFetcher::new(vec![
        (URL_A, Availability::InStock(1200.0), Some("Kettle")),
        (URL_B, Availability::InStock(480.0), Some("Sneakers")),
    ]);
    let notifier = std::sync::Arc::new(RecordingNotifier::default());
    let worker = std::sync::Arc::new(CheckWorker::new(
        storage.clone(),
        fetcher,
        notifier.clone(),
    ));
    let scheduler = PriceScheduler::new(storage.clone(), worker, test_scheduler_config());

    let mut inflight = JoinSet::new();
    scheduler.tick(&mut inflight).await?;
    drain(&mut inflight).await;

    assert_eq!(storage.price_history(URL_A).await?.len(), 1);
    assert_eq!(storage.price_history(URL_B).await?.len(), 1);

    let messages = notifier.messages.lock().await;
    assert_eq!(messages.len(), 1);
    let message = &messages[0].1;
    assert!(message.contains("Kettle"));
    assert!(message.contains("Sneakers"));
    assert!(message.contains("(target: 500 ₽)"));
    Ok(())
}

#[tokio::test]
async fn test_repeat_notification_on_every_due_cycle() -> anyhow::Result<()> {
    let storage = test_storage().await;
    storage.upsert_item(&tracked(42, URL_B, Some(500.0))).await?;

    let fetcher = ScriptedFetcher::new(vec![(
        URL_B,
        Availability::InStock(480.0),
        Some("Sneakers"),
    )]);
    let notifier = std::sync::Arc::new(RecordingNotifier::default());
    let worker = std::sync::Arc::new(CheckWorker::new(
        storage.clone(),
        fetcher,
        notifier.clone(),
    ));
    let scheduler = PriceScheduler::new(storage.clone(), worker, test_scheduler_config());

    let mut inflight = JoinSet::new();
    assert_eq!(scheduler.tick(&mut inflight).await?, 1);
    drain(&mut inflight).await;

    // Age the last check so the user is due again; the same condition
    // re-notifies without suppression.
    storage
        .mark_user_checked(42, Utc::now() - Duration::minutes(10))
        .await?;
    assert_eq!(scheduler.tick(&mut inflight).await?, 1);
    drain(&mut inflight).await;

    assert_eq!(notifier.messages.lock().await.len(), 2);
    assert_eq!(storage.price_history(URL_B).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_tick_prunes_old_history() -> anyhow::Result<()> {
    let storage = test_storage().await;
    let now = Utc::now();
    storage.append_price(URL_A, 900.0, now - Duration::days(8)).await?;
    storage.append_price(URL_A, 1000.0, now - Duration::days(1)).await?;

    let fetcher = ScriptedFetcher::new(vec![]);
    let notifier = std::sync::Arc::new(RecordingNotifier::default());
    let worker = std::sync::Arc::new(CheckWorker::new(storage.clone(), fetcher, notifier));
    let scheduler = PriceScheduler::new(storage.clone(), worker, test_scheduler_config());

    let mut inflight = JoinSet::new();
    scheduler.tick(&mut inflight).await?;

    let points = storage.price_history(URL_A).await?;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].price, 1000.0);
    Ok(())
}

#[tokio::test]
async fn test_failed_prune_does_not_abort_the_tick() -> anyhow::Result<()> {
    let storage = test_storage().await;
    storage.upsert_item(&tracked(1, URL_A, None)).await?;
    // Break pruning (and history writes) entirely; due users must still
    // be checked and notified.
    sqlx::query("DROP TABLE price_history")
        .execute(storage.pool())
        .await?;

    let fetcher = ScriptedFetcher::new(vec![(
        URL_A,
        Availability::InStock(1200.0),
        Some("Kettle"),
    )]);
    let notifier = std::sync::Arc::new(RecordingNotifier::default());
    let worker = std::sync::Arc::new(CheckWorker::new(
        storage.clone(),
        fetcher,
        notifier.clone(),
    ));
    let scheduler = PriceScheduler::new(storage.clone(), worker, test_scheduler_config());

    let mut inflight = JoinSet::new();
    let spawned = scheduler.tick(&mut inflight).await?;
    assert_eq!(spawned, 1);
    drain(&mut inflight).await;

    assert_eq!(notifier.messages.lock().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_loop_checks_and_shuts_down() -> anyhow::Result<()> {
    let storage = test_storage().await;
    storage.upsert_item(&tracked(42, URL_A, None)).await?;

    let fetcher = ScriptedFetcher::new(vec![(
        URL_A,
        Availability::InStock(1200.0),
        Some("Kettle"),
    )]);
    let notifier = std::sync::Arc::new(RecordingNotifier::default());
    let worker = std::sync::Arc::new(CheckWorker::new(
        storage.clone(),
        fetcher,
        notifier.clone(),
    ));
    let scheduler = PriceScheduler::new(storage.clone(), worker, test_scheduler_config());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler.run(shutdown_rx));

    // The first tick fires immediately; give the spawned worker a moment
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    shutdown_tx.send(true)?;
    timeout(std::time::Duration::from_secs(5), handle).await??;

    assert_eq!(storage.price_history(URL_A).await?.len(), 1);
    assert_eq!(notifier.messages.lock().await.len(), 1);
    Ok(())
}
