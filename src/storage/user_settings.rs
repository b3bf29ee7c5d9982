use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{Storage, format_timestamp};
use crate::models::UserSetting;
use crate::utils::error::Result;

impl Storage {
    pub async fn set_check_interval(&self, user_id: i64, interval_minutes: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, check_interval)
            VALUES (?, ?)
            ON CONFLICT (user_id) DO UPDATE SET check_interval = excluded.check_interval
            "#,
        )
        .bind(user_id)
        .bind(interval_minutes)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn all_user_settings(&self) -> Result<HashMap<i64, UserSetting>> {
        let rows = sqlx::query_as::<_, UserSetting>(
            "SELECT user_id, check_interval, last_check FROM user_settings",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(|s| (s.user_id, s)).collect())
    }

    /// Records that a check cycle was spawned for the user. Called by the
    /// scheduler loop at spawn time, not at cycle completion.
    pub async fn mark_user_checked(&self, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, last_check)
            VALUES (?, ?)
            ON CONFLICT (user_id) DO UPDATE SET last_check = excluded.last_check
            "#,
        )
        .bind(user_id)
        .bind(format_timestamp(at))
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
