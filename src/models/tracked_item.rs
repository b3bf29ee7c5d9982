use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Site;
use crate::utils::error::AppError;

/// One (user, product URL) subscription. `(user_id, url)` is unique;
/// re-adding the same pair overwrites name, target price and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TrackedItem {
    pub user_id: i64,
    pub url: String,
    pub site: Site,
    pub target_price: Option<f64>,
    pub cached_name: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrackedItem {
    pub user_id: i64,
    pub url: String,
    pub target_price: Option<f64>,
    pub cached_name: Option<String>,
}

impl TrackedItem {
    pub fn new(new_item: NewTrackedItem) -> Result<Self, AppError> {
        let site = Site::from_url(&new_item.url).ok_or_else(|| {
            AppError::Validation(format!("Unsupported marketplace URL: {}", new_item.url))
        })?;

        Ok(Self {
            user_id: new_item.user_id,
            url: new_item.url,
            site,
            target_price: new_item.target_price,
            cached_name: new_item.cached_name,
            added_at: Utc::now(),
        })
    }

    /// Name shown to the user: freshly fetched name, falling back to the
    /// cached one, falling back to the raw URL.
    pub fn display_name(&self, fetched_name: Option<&str>) -> String {
        fetched_name
            .map(str::to_string)
            .or_else(|| self.cached_name.clone())
            .unwrap_or_else(|| self.url.clone())
    }
}
