use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user scheduling override. At most one row per user.
///
/// `last_check` is kept as the raw stored string: the interval policy
/// parses it and deliberately treats unparseable values as "due" rather
/// than failing closed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserSetting {
    pub user_id: i64,
    pub check_interval: Option<i64>,
    pub last_check: Option<String>,
}

impl UserSetting {
    pub fn last_check_at(&self) -> Option<Result<DateTime<Utc>, chrono::ParseError>> {
        self.last_check
            .as_deref()
            .map(|raw| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
    }
}
