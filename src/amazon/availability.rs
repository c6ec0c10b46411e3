//! Heuristic stock availability detection over product page text.
//!
//! Marketplace listings often show an "out of stock" banner for one seller
//! while still being purchasable from another, so purchase affordances are
//! checked before any unavailability phrase.

use serde::{Deserialize, Serialize};

/// Phrases that only appear when the page offers a purchase action.
const AFFORDANCE_PHRASES: &[&str] =
    &["add to cart", "buy now", "purchase options and add-ons", "other sellers"];

const IN_STOCK_PHRASES: &[&str] = &["in stock", "available to ship", "ready to ship"];

const UNAVAILABLE_PHRASES: &[&str] =
    &["currently unavailable", "temporarily out of stock", "out of stock"];

/// Stock state inferred from a product page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
    Unavailable,
    #[default]
    Unknown,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::InStock => write!(f, "in-stock"),
            Availability::Unavailable => write!(f, "unavailable"),
            Availability::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classifies page text. Whitespace runs are collapsed and case is ignored.
pub fn classify(html: &str) -> Availability {
    let normalized = html.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let contains_any = |phrases: &[&str]| phrases.iter().any(|p| normalized.contains(p));

    if contains_any(AFFORDANCE_PHRASES) || contains_any(IN_STOCK_PHRASES) {
        Availability::InStock
    } else if contains_any(UNAVAILABLE_PHRASES) {
        Availability::Unavailable
    } else {
        Availability::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affordance_beats_unavailable_banner() {
        let html = r#"<div id="availability">Currently unavailable.</div>
            <input id="add-to-cart-button" value="Add to Cart">"#;
        assert_eq!(classify(html), Availability::InStock);
    }

    #[test]
    fn test_other_sellers_is_in_stock() {
        let html = "<span>Temporarily out of stock.</span><a>See All Buying Options from Other Sellers</a>";
        assert_eq!(classify(html), Availability::InStock);
    }

    #[test]
    fn test_only_temporarily_out_of_stock() {
        assert_eq!(classify("<span>Temporarily out of stock.</span>"), Availability::Unavailable);
    }

    #[test]
    fn test_generic_in_stock() {
        assert_eq!(classify("<span class=\"a-color-success\">In Stock</span>"), Availability::InStock);
        assert_eq!(classify("Usually ready to ship in 2 days"), Availability::InStock);
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(classify("<b>Add\n   to\t\tCart</b>"), Availability::InStock);
        assert_eq!(classify("Currently\n\n  Unavailable"), Availability::Unavailable);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("<html><body>Robot check</body></html>"), Availability::Unknown);
        assert_eq!(classify(""), Availability::Unknown);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Availability::InStock.to_string(), "in-stock");
        assert_eq!(Availability::Unavailable.to_string(), "unavailable");
        assert_eq!(Availability::Unknown.to_string(), "unknown");
        assert_eq!(serde_json::to_string(&Availability::InStock).unwrap(), "\"in-stock\"");
    }
}
