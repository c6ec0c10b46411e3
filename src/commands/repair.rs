//! Missing-image repair command implementation.

use crate::amazon::{is_amazon_link, AmazonClient, PageFetcher, Parser};
use crate::catalog::{CatalogStore, Product};
use crate::config::Config;
use crate::images::ImageProvisioner;
use crate::prompt::Prompter;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Counts reported at the end of a repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Records whose image was missing at the start of the run
    pub missing: usize,
    pub updated: usize,
    /// Records the operator chose to skip
    pub skipped: usize,
    /// Records that failed to download, decode or patch
    pub failed: usize,
}

/// Re-provisions images for records whose image is a placeholder or absent.
pub struct RepairCommand {
    config: Config,
    dry_run: bool,
}

impl RepairCommand {
    /// Creates a new repair command.
    pub fn new(config: Config) -> Self {
        Self { config, dry_run: false }
    }

    /// Only list the records that need an image.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Repairs every record with a missing image.
    pub async fn execute(&self, prompter: &mut impl Prompter) -> Result<RepairSummary> {
        let client =
            AmazonClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client, prompter).await
    }

    /// Repairs with a provided client (for testing).
    ///
    /// Per-record failures are reported and skipped. The catalog is written once
    /// at the end, and only if at least one record changed. A failed prompt
    /// stops the run after that write.
    pub async fn execute_with_client(
        &self,
        client: &impl PageFetcher,
        prompter: &mut impl Prompter,
    ) -> Result<RepairSummary> {
        let mut store = CatalogStore::load(&self.config.catalog_path)?;
        let provisioner = ImageProvisioner::from_config(&self.config);

        let missing: Vec<Product> = store
            .products()
            .iter()
            .filter(|p| p.image_missing(provisioner.images_dir(), &self.config.placeholder_image))
            .cloned()
            .collect();

        let mut summary = RepairSummary { missing: missing.len(), ..Default::default() };

        if missing.is_empty() {
            println!("All products already have images on disk.");
            return Ok(summary);
        }

        println!("Found {} product(s) missing images.\n", missing.len());

        if self.dry_run {
            for product in &missing {
                println!("  {} ({}) -> {}", product.name, product.id, display_image(product));
            }
            return Ok(summary);
        }

        let mut interrupted = None;

        for product in &missing {
            println!("Processing {} ({})", product.name, product.id);

            let image_url = match self.resolve_image_url(client, prompter, product).await {
                Ok(Some(url)) => url,
                Ok(None) => {
                    println!("  Skipped.\n");
                    summary.skipped += 1;
                    continue;
                }
                // Records already updated are still written below.
                Err(e) => {
                    summary.skipped += 1;
                    interrupted = Some(e);
                    break;
                }
            };

            let result = async {
                let filename = provisioner.provision(client, &image_url, &product.id).await?;
                store.set_image(&product.id, &filename)?;
                anyhow::Ok(filename)
            }
            .await;

            match result {
                Ok(filename) => {
                    summary.updated += 1;
                    println!("  Saved optimized image as {}.\n", filename);
                }
                Err(e) => {
                    warn!("Repair failed for {}: {:#}", product.id, e);
                    eprintln!("  Failed to update image: {:#}\n", e);
                    summary.failed += 1;
                }
            }
        }

        if summary.updated > 0 {
            store.save()?;
            println!("Updated {} product(s) in {}.", summary.updated, store.path().display());
        } else {
            println!("No changes were written to {}.", store.path().display());
        }

        info!(
            "Repair finished: {} missing, {} updated, {} skipped, {} failed",
            summary.missing, summary.updated, summary.skipped, summary.failed
        );

        if let Some(e) = interrupted {
            return Err(e.context("Repair interrupted while waiting for input"));
        }
        Ok(summary)
    }

    /// Scrapes the listing for an image, falling back to asking the operator.
    /// `None` means the operator left the answer blank.
    async fn resolve_image_url(
        &self,
        client: &impl PageFetcher,
        prompter: &mut impl Prompter,
        product: &Product,
    ) -> Result<Option<String>> {
        if is_amazon_link(&product.link) {
            match client.product_page(&product.link).await {
                Ok(html) => match Parser::new().parse_listing(&html).image_url {
                    Some(url) => {
                        debug!("Found image for {}: {}", product.id, url);
                        return Ok(Some(url));
                    }
                    None => eprintln!("  No image found on the listing."),
                },
                Err(e) => eprintln!("  Unable to fetch listing automatically: {:#}", e),
            }
        } else {
            eprintln!("  Product link is missing or not an Amazon URL.");
        }

        let link = if product.link.is_empty() { "(no link provided)" } else { &product.link };
        println!("  Listing: {}", link);

        let manual = prompter.input("  Enter an image URL (leave blank to skip)", None)?;
        let manual = manual.trim();
        Ok((!manual.is_empty()).then(|| manual.to_string()))
    }
}

fn display_image(product: &Product) -> &str {
    if product.image.is_empty() {
        "(none)"
    } else {
        &product.image
    }
}
