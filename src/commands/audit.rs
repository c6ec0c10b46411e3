//! Link audit command implementation.

use crate::amazon::{classify, is_amazon_host, AmazonClient, Availability, PageFetcher};
use crate::catalog::{CatalogStore, Product};
use crate::config::Config;
use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of checking one record's link.
#[derive(Debug, Clone, Serialize)]
pub struct LinkCheck {
    pub id: String,
    pub link: String,
    /// Final HTTP status; `None` on transport failure
    pub status: Option<u16>,
    pub ok: bool,
    pub availability: Availability,
    /// URL after redirects
    pub final_url: Option<String>,
    pub issues: Vec<String>,
}

impl LinkCheck {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Issues joined with `"; "`, or `None` when clean.
    pub fn issues_summary(&self) -> String {
        if self.issues.is_empty() {
            "None".to_string()
        } else {
            self.issues.join("; ")
        }
    }
}

/// All checks, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub checks: Vec<LinkCheck>,
}

impl AuditReport {
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.has_issues()).count()
    }

    pub fn has_issues(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Fetches every product link and classifies availability.
pub struct AuditCommand {
    config: Config,
}

impl AuditCommand {
    /// Creates a new audit command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Audits every link in the catalog.
    pub async fn execute(&self) -> Result<AuditReport> {
        let client =
            AmazonClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client).await
    }

    /// Audits with a provided client (for testing).
    ///
    /// All fetches run concurrently; one record's failure never blocks another.
    pub async fn execute_with_client(&self, client: &impl PageFetcher) -> Result<AuditReport> {
        let store = CatalogStore::load(&self.config.catalog_path)?;
        info!("Checking {} product links", store.products().len());

        let checks = join_all(store.products().iter().map(|p| check_link(client, p))).await;
        let report = AuditReport { checks };

        debug!("{} of {} links have issues", report.failed_count(), report.checks.len());
        Ok(report)
    }
}

/// Checks a single product link. Never fails; problems become issues.
pub async fn check_link<F>(client: &F, product: &Product) -> LinkCheck
where
    F: PageFetcher + ?Sized,
{
    let mut check = LinkCheck {
        id: product.id.clone(),
        link: product.link.clone(),
        status: None,
        ok: false,
        availability: Availability::Unknown,
        final_url: None,
        issues: Vec::new(),
    };

    let page = match client.fetch(&product.link).await {
        Ok(page) => page,
        Err(e) => {
            check.issues.push(format!("Request error: {:#}", e));
            return check;
        }
    };

    check.status = Some(page.status);
    check.ok = page.is_success();
    check.final_url = Some(page.final_url.clone());

    if !check.ok {
        check.issues.push(format!("Request failed with status {}", page.status));
        return check;
    }

    if page.is_html() && is_amazon_host(&page.final_url) {
        check.availability = classify(&page.body);
        if check.availability == Availability::Unavailable {
            check.issues.push("Product appears to be unavailable on Amazon".to_string());
        }
    }

    check
}
