use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::models::UserSetting;

/// Decides whether a user's next check cycle is due.
///
/// A user with no settings row, or no recorded last check, is always due.
/// A stored timestamp that fails to parse also counts as due: a broken
/// row must not silence a user's notifications forever.
pub fn is_due(
    now: DateTime<Utc>,
    setting: Option<&UserSetting>,
    default_interval_minutes: i64,
) -> bool {
    let Some(setting) = setting else {
        return true;
    };

    let interval_minutes = setting
        .check_interval
        .filter(|&minutes| minutes >= 1)
        .unwrap_or(default_interval_minutes);

    match setting.last_check_at() {
        None => true,
        Some(Ok(last_check)) => now >= last_check + Duration::minutes(interval_minutes),
        Some(Err(e)) => {
            warn!(user_id = setting.user_id, error = %e, "unparseable last_check, treating user as due");
            true
        }
    }
}
