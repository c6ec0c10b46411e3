//! Selectors and patterns for Amazon product page parsing.
//!
//! This file contains every selector and regex used to pull listing
//! metadata out of raw product page markup.
//! Update this file when Amazon changes their HTML structure.

use regex_lite::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for product detail pages.
pub mod product {
    use super::*;

    /// Open Graph title meta tag.
    pub static OG_TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:title']").unwrap());

    /// Product title element on the detail page.
    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span#productTitle").unwrap());

    /// Open Graph image meta tag.
    pub static OG_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:image']").unwrap());

    /// Meta description tag.
    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[name='description']").unwrap());
}

/// Regex patterns over raw page text and URLs.
pub mod patterns {
    use super::*;

    /// High-resolution image URL embedded in the image gallery JSON.
    pub static HI_RES_IMAGE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?i)"hiRes":"(https:[^"]+)""#).unwrap());

    /// Store suffix appended to page titles, e.g. `Foo | Amazon.com: Health`.
    pub static TITLE_STORE_SUFFIX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\s*\|\s*Amazon\.com.*$").unwrap());

    /// Amazon storefront or amzn.to short link.
    pub static AMAZON_URL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^\s*https?://(([\w.-]+\.)?amazon\.[a-z.]+|amzn\.to)(/|$)").unwrap()
    });

    /// Amazon-family host name.
    pub static AMAZON_HOST: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(?:amazon|amzn)\.").unwrap());
}
