use serde::{Deserialize, Serialize};

use crate::models::Site;

const SEPARATOR_WIDTH: usize = 20;

/// One item that satisfied the notify predicate during a check cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEntry {
    pub site: Site,
    pub display_name: String,
    pub price: f64,
    pub url: String,
    pub target_price: Option<f64>,
}

/// Renders one batched HTML message for a user from the entries a check
/// cycle produced, in the order the items were processed.
pub fn compose_batch(entries: &[NotificationEntry]) -> String {
    let mut lines = vec!["✨ Price update for your tracked items!".to_string(), String::new()];
    let separator = "─".repeat(SEPARATOR_WIDTH);

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            lines.push(separator.clone());
        }

        let mut price_str = format!("{} ₽", entry.price as i64);
        if let Some(target) = entry.target_price {
            price_str.push_str(&format!(" (target: {} ₽)", target as i64));
        }

        lines.push(format!(
            "{} <b>{}</b> | <a href=\"{}\">{}</a>\n💰 {}",
            entry.site.icon(),
            entry.site.label(),
            entry.url,
            escape_html(&entry.display_name),
            price_str,
        ));
    }

    lines.join("\n")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
