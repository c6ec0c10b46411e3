//! affiliate-catalog - Maintenance CLI for an Amazon affiliate product catalog
//!
//! Scrapes Amazon listings into a TOML catalog, provisions optimized product
//! images, and audits affiliate links for reachability and stock.

pub mod amazon;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod images;
pub mod prompt;

#[cfg(test)]
mod test_support;

pub use amazon::Availability;
pub use catalog::{slugify, CatalogStore, Product};
pub use config::Config;
pub use error::CatalogError;
