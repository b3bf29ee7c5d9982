use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::{Availability, PriceFetcher, Quote};
use crate::config::FetcherConfig;
use crate::models::Site;
use crate::utils::error::{AppError, Result};

const OZON_PRICE_SELECTORS: &[&str] = &[
    "span.tsHeadline600Large",
    "div[data-widget=\"webPrice\"] span",
    "span[data-test-id=\"price-block-current-price\"]",
];
const OZON_NAME_SELECTORS: &[&str] = &["h1.pdp_bg9.tsHeadline550Medium", "h1"];

const WB_PRICE_SELECTORS: &[&str] = &["h2[class*=\"mo-typography_color_danger\"]"];
const WB_NAME_SELECTORS: &[&str] = &["h3[class*=\"productTitle\"]", "h1"];

const OUT_OF_STOCK_MARKERS: &[&str] = &["Товар закончился", "Нет в наличии", "Распродан"];

/// Plain-HTTP `PriceFetcher` for Ozon and Wildberries product pages.
pub struct HttpPriceFetcher {
    client: reqwest::Client,
}

impl HttpPriceFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Extracts a quote from an already-fetched page. Separated from the
    /// network call so parsing is testable without a live marketplace.
    pub fn extract_quote(site: Site, html: &str) -> Result<Quote> {
        let document = Html::parse_document(html);

        let (price_selectors, name_selectors) = match site {
            Site::Ozon => (OZON_PRICE_SELECTORS, OZON_NAME_SELECTORS),
            Site::Wildberries => (WB_PRICE_SELECTORS, WB_NAME_SELECTORS),
        };

        let product_name = first_text(&document, name_selectors);

        for raw in price_selectors {
            let selector = parse_selector(raw)?;
            for element in document.select(&selector) {
                let text: String = element.text().collect();
                if let Some(price) = clean_price(&text) {
                    return Ok(Quote {
                        availability: Availability::InStock(price),
                        product_name,
                        promo_text: None,
                    });
                }
            }
        }

        let page_text: String = document.root_element().text().collect();
        if OUT_OF_STOCK_MARKERS.iter().any(|m| page_text.contains(m)) {
            return Ok(Quote {
                availability: Availability::OutOfStock,
                product_name,
                promo_text: None,
            });
        }

        Err(AppError::Fetch("no price element matched".to_string()))
    }
}

#[async_trait]
impl PriceFetcher for HttpPriceFetcher {
    async fn fetch_price(&self, url: &str) -> Result<Quote> {
        let site = Site::from_url(url)
            .ok_or_else(|| AppError::Fetch(format!("unsupported marketplace URL: {url}")))?;

        debug!(%url, site = site.label(), "fetching product page");
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Self::extract_quote(site, &body)
    }
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| AppError::Fetch(format!("bad selector {raw:?}: {e}")))
}

/// Strips everything but digits from a displayed price, e.g.
/// "1 299 ₽" -> 1299.0.
fn clean_price(text: &str) -> Option<f64> {
    static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = NON_DIGITS.get_or_init(|| Regex::new(r"[^\d]").expect("static regex"));

    let digits = re.replace_all(text, "");
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
