use chrono::{DateTime, Utc};

use super::{Storage, format_timestamp};
use crate::models::PricePoint;
use crate::utils::error::Result;

impl Storage {
    pub async fn append_price(&self, url: &str, price: f64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO price_history (url, price, checked_at) VALUES (?, ?, ?)")
            .bind(url)
            .bind(price)
            .bind(format_timestamp(at))
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Observed samples for a URL, newest first.
    pub async fn price_history(&self, url: &str) -> Result<Vec<PricePoint>> {
        let points = sqlx::query_as::<_, PricePoint>(
            "SELECT url, price, checked_at FROM price_history \
             WHERE url = ? ORDER BY checked_at DESC",
        )
        .bind(url)
        .fetch_all(self.pool())
        .await?;
        Ok(points)
    }

    /// Removes samples strictly older than the cutoff. Returns the number
    /// of rows removed.
    pub async fn prune_history(&self, older_than: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM price_history WHERE checked_at < ?")
            .bind(format_timestamp(older_than))
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
