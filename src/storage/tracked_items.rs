use std::collections::HashMap;

use super::{Storage, format_timestamp};
use crate::models::TrackedItem;
use crate::utils::error::Result;

impl Storage {
    /// Inserts the item, or replaces the stored row for the same
    /// `(user_id, url)` pair with the new name, target price and
    /// timestamp.
    pub async fn upsert_item(&self, item: &TrackedItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tracked_items (user_id, url, site, target_price, cached_name, added_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, url) DO UPDATE SET
                site = excluded.site,
                target_price = excluded.target_price,
                cached_name = excluded.cached_name,
                added_at = excluded.added_at
            "#,
        )
        .bind(item.user_id)
        .bind(&item.url)
        .bind(item.site)
        .bind(item.target_price)
        .bind(&item.cached_name)
        .bind(format_timestamp(item.added_at))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn items_for_user(&self, user_id: i64) -> Result<Vec<TrackedItem>> {
        let items = sqlx::query_as::<_, TrackedItem>(
            "SELECT user_id, url, site, target_price, cached_name, added_at \
             FROM tracked_items WHERE user_id = ? ORDER BY added_at, url",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(items)
    }

    /// All tracked items, grouped by user. Items within a group keep
    /// their insertion order so notification batches render in the order
    /// the user added them.
    pub async fn all_items_by_user(&self) -> Result<HashMap<i64, Vec<TrackedItem>>> {
        let rows = sqlx::query_as::<_, TrackedItem>(
            "SELECT user_id, url, site, target_price, cached_name, added_at \
             FROM tracked_items ORDER BY user_id, added_at, url",
        )
        .fetch_all(self.pool())
        .await?;

        let mut grouped: HashMap<i64, Vec<TrackedItem>> = HashMap::new();
        for item in rows {
            grouped.entry(item.user_id).or_default().push(item);
        }
        Ok(grouped)
    }

    pub async fn remove_item(&self, user_id: i64, url: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tracked_items WHERE user_id = ? AND url = ?")
            .bind(user_id)
            .bind(url)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
