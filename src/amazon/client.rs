//! HTTP client for product pages and images using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::error::CatalogError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use wreq::redirect::Policy;
use wreq::Client;
use wreq_util::Emulation;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// A fetched page after redirects, whatever its status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final HTTP status code
    pub status: u16,
    /// URL after following redirects
    pub final_url: String,
    /// Content-Type header, if any
    pub content_type: Option<String>,
    /// Response body as text
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| ct.to_lowercase().contains("text/html"))
    }
}

/// Trait for page/image fetching - enables mocking for tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GETs a page, following redirects. Only transport failures are errors.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;

    /// Downloads raw image bytes. Non-success statuses are errors.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetches product page HTML, failing on non-success statuses.
    async fn product_page(&self, url: &str) -> Result<String> {
        info!("Fetching product page: {}", url);
        let page = self.fetch(url).await?;
        if !page.is_success() {
            return Err(CatalogError::HttpStatus { url: url.to_string(), status: page.status }.into());
        }
        Ok(page.body)
    }
}

/// Amazon HTTP client with browser impersonation.
pub struct AmazonClient {
    client: Client,
    user_agent: String,
    accept_language: String,
}

impl AmazonClient {
    /// Creates a new client with the given configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        })
    }
}

#[async_trait]
impl PageFetcher for AmazonClient {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", &self.user_agent)
            .header("Accept", ACCEPT_HTML)
            .header("Accept-Language", &self.accept_language)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status().as_u16();
        let final_url = response.uri().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        debug!("Response status: {} ({})", status, final_url);

        let body = response.text().await.context("Failed to read response body")?;

        Ok(FetchedPage { status, final_url, content_type, body })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET image {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .context("Failed to send image request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus { url: url.to_string(), status: status.as_u16() }.into());
        }

        let bytes = response.bytes().await.context("Failed to read image body")?;
        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
