use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;

pub use http::HttpPriceFetcher;

/// Stock state reported by a successful fetch. A fetch failure is a
/// separate outcome (an `Err` from the fetcher), never a variant here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Availability {
    InStock(f64),
    OutOfStock,
}

/// Snapshot of one product page at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub availability: Availability,
    pub product_name: Option<String>,
    pub promo_text: Option<String>,
}

/// External price-fetch collaborator. Implementations are responsible
/// for bounding their own latency.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch_price(&self, url: &str) -> crate::Result<Quote>;
}
