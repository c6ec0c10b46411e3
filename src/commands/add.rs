//! Add-product command implementation.

use crate::amazon::{is_amazon_link, AmazonClient, PageFetcher, Parser};
use crate::catalog::{slugify, CatalogStore, Product};
use crate::config::Config;
use crate::error::CatalogError;
use crate::images::ImageProvisioner;
use crate::prompt::Prompter;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Scrapes an Amazon listing and appends it to the catalog.
pub struct AddCommand {
    config: Config,
}

impl AddCommand {
    /// Creates a new add command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Adds the product at `url`, prompting the operator for details.
    pub async fn execute(&self, url: &str, prompter: &mut impl Prompter) -> Result<Product> {
        let client =
            AmazonClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client, prompter, url).await
    }

    /// Adds a product with a provided client (for testing).
    ///
    /// Nothing is written to the catalog unless every step succeeds. The image
    /// file is written before the catalog and is left in place if a later step fails.
    pub async fn execute_with_client(
        &self,
        client: &impl PageFetcher,
        prompter: &mut impl Prompter,
        url: &str,
    ) -> Result<Product> {
        let url = url.trim();
        if !is_amazon_link(url) {
            return Err(CatalogError::InvalidUrl(url.to_string()).into());
        }

        let mut store = CatalogStore::load(&self.config.catalog_path)?;
        let categories = store.categories();
        if categories.is_empty() {
            return Err(CatalogError::NoCategories(store.path().display().to_string()).into());
        }
        debug!("Category vocabulary: {:?}", categories);

        println!("Fetching product page...");
        let html = client.product_page(url).await?;
        let listing = Parser::new().parse_listing(&html);

        let default_name = listing.default_name();
        let name = prompter.input("Product name", Some(&default_name))?.trim().to_string();
        let description = prompter
            .input("Product description", listing.description.as_deref())?
            .trim()
            .to_string();
        let chosen = select_categories(prompter, &categories)?;

        let id = slugify(&name);
        if id.is_empty() {
            return Err(CatalogError::MissingName.into());
        }
        if store.contains_id(&id) {
            return Err(CatalogError::DuplicateId(id).into());
        }

        let image_url = match listing.image_url {
            Some(image_url) => image_url,
            None => {
                let manual = prompter.input("Image URL (required)", None)?;
                let manual = manual.trim();
                if manual.is_empty() {
                    return Err(CatalogError::MissingImageUrl.into());
                }
                manual.to_string()
            }
        };

        let provisioner = ImageProvisioner::from_config(&self.config);
        let image = provisioner.provision(client, &image_url, &id).await?;
        println!("Saved image to {}", provisioner.images_dir().join(&image).display());

        let product = Product {
            id,
            name,
            description,
            categories: chosen,
            image,
            link: url.to_string(),
        };

        store.append(product.clone())?;
        store.save()?;

        info!("Added {} with id {}", product.name, product.id);
        println!("Added {} to {} with id {}.", product.name, store.path().display(), product.id);
        Ok(product)
    }
}

/// Asks until the operator picks at least one category.
fn select_categories(prompter: &mut impl Prompter, categories: &[String]) -> Result<Vec<String>> {
    loop {
        let picked = prompter.multi_select("Select categories", categories)?;
        if !picked.is_empty() {
            return Ok(picked);
        }
        eprintln!("Please select at least one category.");
    }
}
