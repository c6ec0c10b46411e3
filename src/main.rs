//! affiliate-catalog - Maintenance CLI for an Amazon affiliate product catalog
//!
//! Adds products from Amazon listings, repairs missing images, and audits links.

use affiliate_catalog::catalog::CatalogStore;
use affiliate_catalog::commands::{AddCommand, AuditCommand, RepairCommand};
use affiliate_catalog::config::{Config, OutputFormat};
use affiliate_catalog::format::Formatter;
use affiliate_catalog::prompt::TerminalPrompter;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "affiliate-catalog",
    version,
    about = "Maintenance CLI for an Amazon affiliate product catalog",
    long_about = "Scrapes Amazon listings into the product catalog, provisions optimized images, and audits affiliate links."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog TOML file (overrides CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory holding product images (overrides CATALOG_IMAGES_DIR)
    #[arg(long, global = true)]
    images: Option<PathBuf>,

    /// Proxy URL, e.g. socks5://host:port (overrides CATALOG_PROXY)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product from an Amazon URL or amzn.to short link
    #[command(alias = "a")]
    Add {
        /// Amazon product URL
        url: String,
    },

    /// Download images for products that are missing one
    #[command(alias = "r")]
    Repair {
        /// Only list the products that need an image
        #[arg(long)]
        dry_run: bool,
    },

    /// Check every product link for reachability and stock
    Audit {
        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// List the category vocabulary
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Config file, then CATALOG_* env vars, then CLI flags
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }
    if let Some(images) = cli.images {
        config.images_dir = images;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Add { url } => {
            let cmd = AddCommand::new(config);
            let mut prompter = TerminalPrompter::new();
            cmd.execute(&url, &mut prompter).await?;
        }

        Commands::Repair { dry_run } => {
            let cmd = RepairCommand::new(config).dry_run(dry_run);
            let mut prompter = TerminalPrompter::new();
            let summary = cmd.execute(&mut prompter).await?;

            if summary.failed > 0 || summary.skipped > 0 {
                eprintln!("{} skipped, {} failed.", summary.skipped, summary.failed);
            }
        }

        Commands::Audit { format } => {
            if let Some(format) = format {
                config.format = format;
            }

            let formatter = Formatter::new(config.format);
            let report = AuditCommand::new(config).execute().await?;
            println!("{}", formatter.format_report(&report));

            if report.has_issues() {
                eprintln!(
                    "\n{} product(s) have issues. See table above for details.",
                    report.failed_count()
                );
                std::process::exit(1);
            }

            eprintln!("\nAll product links look good!");
        }

        Commands::Categories => {
            let store = CatalogStore::load(&config.catalog_path)?;
            for category in store.categories() {
                println!("{}", category);
            }
        }
    }

    Ok(())
}
