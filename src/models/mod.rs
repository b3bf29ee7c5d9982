use serde::{Deserialize, Serialize};
use url::Url;

pub mod price_history;
pub mod tracked_item;
pub mod user_setting;

// Re-exports for convenience
pub use price_history::*;
pub use tracked_item::*;
pub use user_setting::*;

/// Marketplace a tracked URL belongs to. Derived once from the URL host
/// at ingestion time and stored alongside the item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT")]
pub enum Site {
    #[sqlx(rename = "ozon")]
    Ozon,
    #[sqlx(rename = "wildberries")]
    Wildberries,
}

impl Site {
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        if host == "ozon.ru" || host.ends_with(".ozon.ru") {
            Some(Site::Ozon)
        } else if host == "wildberries.ru" || host.ends_with(".wildberries.ru") {
            Some(Site::Wildberries)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Site::Ozon => "Ozon",
            Site::Wildberries => "Wildberries",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Site::Ozon => "🔵",
            Site::Wildberries => "🟣",
        }
    }
}
