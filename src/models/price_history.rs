use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One observed price sample for a URL. Append-only; rows older than the
/// retention window are pruned by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PricePoint {
    pub url: String,
    pub price: f64,
    pub checked_at: DateTime<Utc>,
}
