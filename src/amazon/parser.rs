//! HTML parser for Amazon product pages.

use crate::amazon::selectors::{patterns, product};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Metadata scraped from a product page. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Raw page title as found in the markup
    pub title: Option<String>,
    /// Meta description
    pub description: Option<String>,
    /// Primary product image URL
    pub image_url: Option<String>,
}

impl Listing {
    /// Title with the `| Amazon.com...` store suffix removed, for use as a default name.
    pub fn default_name(&self) -> String {
        self.title
            .as_deref()
            .map(|t| patterns::TITLE_STORE_SUFFIX.replace(t, "").trim().to_string())
            .unwrap_or_default()
    }
}

/// Parser for Amazon product page HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Extracts title, description and image URL. Misses are `None`, never errors.
    pub fn parse_listing(&self, html: &str) -> Listing {
        let document = Html::parse_document(html);

        let title = meta_content(&document, &product::OG_TITLE).or_else(|| {
            document
                .select(&product::TITLE)
                .next()
                .map(|e| element_text(&e))
                .filter(|t| !t.is_empty())
        });

        let description = meta_content(&document, &product::DESCRIPTION);
        let image_url = meta_content(&document, &product::OG_IMAGE).or_else(|| self.hi_res_image(html));

        debug!(
            "Parsed listing (title: {}, description: {}, image: {})",
            title.is_some(),
            description.is_some(),
            image_url.is_some()
        );

        Listing { title, description, image_url }
    }

    /// Finds an embedded `"hiRes"` gallery URL, unescaping `&`.
    pub fn hi_res_image(&self, html: &str) -> Option<String> {
        let url = patterns::HI_RES_IMAGE.captures(html)?.get(1)?.as_str().replace("\\u0026", "&");
        trace!("Found hiRes image: {}", url);
        Some(url)
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|e| e.value().attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_open_graph() {
        let html = r#"<html><head>
            <meta property="og:title" content="Vive Toilet Rail | Amazon.com: Health &amp; Household" />
            <meta property="og:image" content="https://m.media-amazon.com/images/I/71rail.jpg" />
            <meta name="description" content="  Sturdy rail for the toilet.  " />
        </head><body><span id="productTitle">Ignored</span></body></html>"#;

        let listing = Parser::new().parse_listing(html);
        assert_eq!(listing.title.as_deref(), Some("Vive Toilet Rail | Amazon.com: Health & Household"));
        assert_eq!(listing.default_name(), "Vive Toilet Rail");
        assert_eq!(listing.description.as_deref(), Some("Sturdy rail for the toilet."));
        assert_eq!(listing.image_url.as_deref(), Some("https://m.media-amazon.com/images/I/71rail.jpg"));
    }

    #[test]
    fn test_parse_fallbacks() {
        let html = r#"<html><body>
            <span id="productTitle" class="a-size-large">
                Shower Chair with Back
            </span>
            <script>var data = {"colorImages":[{"hiRes":"https://m.media-amazon.com/images/I/81chair.jpg?a=1\u0026b=2","thumb":"x"}]};</script>
        </body></html>"#;

        let listing = Parser::new().parse_listing(html);
        assert_eq!(listing.title.as_deref(), Some("Shower Chair with Back"));
        assert_eq!(listing.default_name(), "Shower Chair with Back");
        assert!(listing.description.is_none());
        assert_eq!(
            listing.image_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/81chair.jpg?a=1&b=2")
        );
    }

    #[test]
    fn test_parse_empty_page() {
        let listing = Parser::new().parse_listing("<html><body>Robot check</body></html>");
        assert_eq!(listing, Listing::default());
        assert_eq!(listing.default_name(), "");
    }

    #[test]
    fn test_empty_meta_content_ignored() {
        let html = r#"<meta property="og:image" content="">
            <script>{"hiRes":"https://img.example/x.png"}</script>"#;
        let listing = Parser::new().parse_listing(html);
        assert_eq!(listing.image_url.as_deref(), Some("https://img.example/x.png"));
    }

    #[test]
    fn test_hi_res_requires_https() {
        let html = r#"{"hiRes":"http://insecure.example/x.jpg"}"#;
        assert!(Parser::new().hi_res_image(html).is_none());
    }
}
