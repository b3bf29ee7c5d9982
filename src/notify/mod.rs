use async_trait::async_trait;

pub mod telegram;

pub use telegram::TelegramNotifier;

/// External delivery collaborator. Best-effort: callers log failures and
/// move on, there is no retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: i64, message: &str) -> crate::Result<()>;
}
